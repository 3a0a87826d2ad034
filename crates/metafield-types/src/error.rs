//! Error taxonomy and its HTTP mapping.

use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::types::ErrorResponse;

pub type MfResult<T> = std::result::Result<T, Error>;

/// Machine-readable reason attached to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
	InvalidParent,
	UnknownKey,
	NotVisible,
	InvalidEntryId,
	Forbidden,
	ForbiddenContext,
	InvalidKey,
	InvalidValue,
	InvalidExistingValue,
	MissingParameter,
	ParentMismatch,
	InvalidParameters,
	TrashingUnsupported,
	CouldNotAdd,
	CouldNotUpdate,
	CouldNotDelete,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::InvalidParent => "invalid_parent",
			ErrorCode::UnknownKey => "unknown_key",
			ErrorCode::NotVisible => "not_visible",
			ErrorCode::InvalidEntryId => "invalid_entry_id",
			ErrorCode::Forbidden => "forbidden",
			ErrorCode::ForbiddenContext => "forbidden_context",
			ErrorCode::InvalidKey => "invalid_key",
			ErrorCode::InvalidValue => "invalid_value",
			ErrorCode::InvalidExistingValue => "invalid_existing_value",
			ErrorCode::MissingParameter => "missing_parameter",
			ErrorCode::ParentMismatch => "parent_mismatch",
			ErrorCode::InvalidParameters => "invalid_parameters",
			ErrorCode::TrashingUnsupported => "trashing_unsupported",
			ErrorCode::CouldNotAdd => "could_not_add",
			ErrorCode::CouldNotUpdate => "could_not_update",
			ErrorCode::CouldNotDelete => "could_not_delete",
		}
	}

	/// Human-readable message used in error bodies
	pub fn message(self) -> &'static str {
		match self {
			ErrorCode::InvalidParent => "Invalid parent id.",
			ErrorCode::UnknownKey => "Meta key is not registered.",
			ErrorCode::NotVisible => "Meta entry not found.",
			ErrorCode::InvalidEntryId => "Invalid meta id.",
			ErrorCode::Forbidden => "Sorry, you are not allowed to do that.",
			ErrorCode::ForbiddenContext => "Sorry, you are not allowed to edit this resource.",
			ErrorCode::InvalidKey => "Invalid meta key.",
			ErrorCode::InvalidValue => "Invalid provided meta value.",
			ErrorCode::InvalidExistingValue => "Invalid existing meta value.",
			ErrorCode::MissingParameter => "Missing required parameter.",
			ErrorCode::ParentMismatch => "Meta does not belong to this object.",
			ErrorCode::InvalidParameters => "Neither a key nor a value was supplied.",
			ErrorCode::TrashingUnsupported => "Meta does not support trashing; set force=true.",
			ErrorCode::CouldNotAdd => "Could not add meta.",
			ErrorCode::CouldNotUpdate => "Could not update meta.",
			ErrorCode::CouldNotDelete => "Could not delete meta.",
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug)]
pub enum Error {
	/// Unknown parent, key or entry id
	NotFound(ErrorCode),
	/// Authorization denial
	Forbidden(ErrorCode),
	/// Missing or malformed key/value, non-scalar value, parent mismatch
	InvalidInput(ErrorCode),
	/// Write attempt on a protected key
	PolicyViolation(Box<str>),
	/// Operation is not supported (e.g. delete without force)
	Unsupported(ErrorCode),
	/// The underlying store reported failure
	StoreFailure(ErrorCode),
	/// Key registered twice for the same entity type
	DuplicateKey(Box<str>),
	/// Bearer token missing or invalid
	Unauthorized,
	DbError,
	ConfigError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound(code)
			| Error::Forbidden(code)
			| Error::InvalidInput(code)
			| Error::Unsupported(code)
			| Error::StoreFailure(code) => code.as_str(),
			Error::PolicyViolation(_) => "protected",
			Error::DuplicateKey(_) => "duplicate_key",
			Error::Unauthorized => "unauthorized",
			Error::DbError => "db_error",
			Error::ConfigError(_) => "config_error",
			Error::Internal(_) | Error::Io(_) => "internal",
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Error::NotFound(_) => StatusCode::NOT_FOUND,
			Error::Forbidden(_) | Error::PolicyViolation(_) => StatusCode::FORBIDDEN,
			Error::InvalidInput(_) | Error::DuplicateKey(_) => StatusCode::BAD_REQUEST,
			Error::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
			// A failed add is reported as a client error
			Error::StoreFailure(ErrorCode::CouldNotAdd) => StatusCode::BAD_REQUEST,
			Error::Unauthorized => StatusCode::UNAUTHORIZED,
			Error::StoreFailure(_)
			| Error::DbError
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message(&self) -> String {
		match self {
			Error::NotFound(code)
			| Error::Forbidden(code)
			| Error::InvalidInput(code)
			| Error::Unsupported(code)
			| Error::StoreFailure(code) => code.message().to_string(),
			Error::PolicyViolation(key) => format!("Meta key {} is protected.", key),
			Error::DuplicateKey(key) => format!("Meta key {} is already registered.", key),
			Error::Unauthorized => "Invalid or expired access token.".to_string(),
			// Internal details stay in the logs
			Error::DbError | Error::ConfigError(_) | Error::Internal(_) | Error::Io(_) => {
				"Internal server error.".to_string()
			}
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
			_ => write!(f, "{}: {}", self.code(), self.message()),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::warn!(error = %self, "request failed");
		}
		let body = ErrorResponse::new(self.code().to_string(), self.message());
		(status, Json(body)).into_response()
	}
}


// vim: ts=4
