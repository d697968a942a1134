use thiserror::Error;

use crate::model::ContactError;
use crate::model::UnitError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Contact(#[from] ContactError),
}
