//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod kind;
mod month;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::{is_hex_color, Category, CategoryUpdates, NewCategory, DEFAULT_COLOR, DEFAULT_ICON};
pub use kind::Kind;
pub use month::Month;
pub use transaction::{NewTransaction, Transaction, TransactionFilter, TransactionUpdates};
