mod app_call;
mod common;
mod composer;
mod payment;

pub use app_call::{AppCreateParams, AppUpdateParams, MethodCallParams};
pub use common::{CommonParams, EmptySigner, TxnSigner, TxnSignerGetter};
pub use composer::{Composer, ComposerError, ComposerTxn, TransactionGroup};
pub use payment::PaymentParams;
