//! Shared helpers for the SQLite store

use metafield::prelude::*;

pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a backend error to `Error::DbError` after logging it
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	Error::DbError
}

/// SQLite integers are signed
pub(crate) fn to_db_id(id: u64) -> MfResult<i64> {
	i64::try_from(id).map_err(|_| Error::DbError)
}

pub(crate) fn from_db_id(id: i64) -> Result<u64, sqlx::Error> {
	u64::try_from(id).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub(crate) fn decode_err(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
	sqlx::Error::Decode(Box::new(err))
}

// vim: ts=4
