pub use kernel::id::{ResetTokenId, UserId};
