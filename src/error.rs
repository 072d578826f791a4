//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use num_enum::TryFromPrimitive;

include!(concat!(env!("OUT_DIR"), "/ua.rs"));

pub(crate) fn sdk_version() -> &'static str {
    SDK_VERSION
}

pub(crate) fn user_agent() -> &'static str {
    USER_AGENT
}

/// The error type returned by all operations in this library.
///
/// `code` classifies the failure on the client side. When the FileMaker Server
/// itself rejected a request, `code` is [`FMErrorCode::FileMakerError`] and
/// `server_code` holds the numeric code from the response `messages` block.
#[derive(Debug, Clone)]
pub struct FMError {
    pub code: FMErrorCode,
    pub message: String,
    pub server_code: Option<i32>,
}

impl std::error::Error for FMError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::fmt::Display for FMError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(sc) = self.server_code {
            return write!(
                f,
                "code={:?} server_code={} message=\"{}\"",
                self.code, sc, self.message
            );
        }
        write!(f, "code={:?} message=\"{}\"", self.code, self.message)
    }
}

impl FMError {
    pub fn new(code: FMErrorCode, msg: &str) -> FMError {
        FMError {
            code,
            message: msg.to_string(),
            server_code: None,
        }
    }

    /// Create an error from the code and message returned by FileMaker Server.
    pub fn from_server(icode: i32, msg: &str) -> FMError {
        FMError {
            code: FMErrorCode::FileMakerError,
            message: format!("FileMaker Server returned error {}, {}", icode, msg),
            server_code: Some(icode),
        }
    }

    /// Decode the server error code, if there is one and it is known to this library.
    pub fn fms_error_code(&self) -> Option<FMSErrorCode> {
        FMSErrorCode::try_from(self.server_code?).ok()
    }

    /// Returns true if the server rejected an edit because the supplied
    /// modification id no longer matches the record.
    pub fn is_mod_id_mismatch(&self) -> bool {
        self.fms_error_code() == Some(FMSErrorCode::ModIdMismatch)
    }

    pub(crate) fn is_invalid_token(&self) -> bool {
        self.fms_error_code() == Some(FMSErrorCode::InvalidDataApiToken)
    }
}

macro_rules! ia_error {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        crate::error::FMError {
            code: crate::error::FMErrorCode::IllegalArgument,
            message: format!("{} ({})", m, crate::error::sdk_version()),
            server_code: None,
        }
    }};
}

pub(crate) use ia_error;

macro_rules! ia_err {
    ($($t:tt)*) => {{
        let m = format!($($t)*);
        Err(crate::error::FMError {
            code: crate::error::FMErrorCode::IllegalArgument,
            message: format!("{} ({})", m, crate::error::sdk_version()),
            server_code: None,
        })
    }};
}

pub(crate) use ia_err;

// Same as ia_err, with an explicit code
macro_rules! fm_err {
    ($code:ident, $($t:tt)*) => {{
        Err(crate::error::FMError {
            code: crate::error::FMErrorCode::$code,
            message: format!($($t)*),
            server_code: None,
        })
    }};
}

pub(crate) use fm_err;

impl From<reqwest::Error> for FMError {
    fn from(e: reqwest::Error) -> Self {
        let mut code = FMErrorCode::RequestError;
        if e.is_timeout() {
            code = FMErrorCode::RequestTimeout;
        }
        FMError {
            code,
            message: format!("reqwest error: {} ({})", e, sdk_version()),
            server_code: None,
        }
    }
}

impl From<reqwest::header::InvalidHeaderValue> for FMError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        ia_error!("invalid header value: {}", e)
    }
}

impl From<url::ParseError> for FMError {
    fn from(e: url::ParseError) -> Self {
        ia_error!("error parsing url: {}", e)
    }
}

impl From<chrono::ParseError> for FMError {
    fn from(e: chrono::ParseError) -> Self {
        ia_error!("invalid datetime value: {}", e)
    }
}

impl From<serde_json::Error> for FMError {
    fn from(e: serde_json::Error) -> Self {
        FMError {
            code: FMErrorCode::BadJSON,
            message: format!("invalid json: {} ({})", e, sdk_version()),
            server_code: None,
        }
    }
}

/// Client-side error categories.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FMErrorCode {
    /// The application supplied an illegal argument, or a value could not be
    /// converted to the requested type.
    IllegalArgument,

    /// The requested field is not one of the record's fields. Note that the
    /// Data API only returns fields that are placed on the layout.
    FieldNotFound,

    /// Attribute-style access ([`Record::attr()`](crate::Record::attr())) of a
    /// field that does not exist.
    AttributeNotFound,

    /// Portal fields (`portal_<name>`) cannot be set through a record. Portal
    /// rows are written with the `portals` payload of create/edit requests.
    PortalWriteNotSupported,

    /// Indexed access to a [`Foundset`](crate::Foundset) past its last item.
    IndexOutOfRange,

    /// The decoded response does not have the expected shape, for example
    /// a missing `data` array.
    BadResponse,

    /// The server responded with something that is not valid JSON.
    BadJSON,

    /// The local record cannot be used for the operation, typically because
    /// it was built locally and has no `recordId`.
    RecordError,

    /// The http request could not be completed.
    RequestError,

    /// The http request did not complete within the timeout.
    RequestTimeout,

    /// FileMaker Server returned a non-zero error code. See
    /// [`FMError::server_code`] and [`FMError::fms_error_code()`].
    FileMakerError,

    /// Anything else.
    UnknownError,
}

/// FileMaker Server error codes referenced by this library.
///
/// The server reports many more codes than listed here; unlisted codes are
/// still available as the raw [`FMError::server_code`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive)]
#[repr(i32)]
pub enum FMSErrorCode {
    Success = 0,
    UserCanceled = 1,
    FileMissing = 100,
    RecordMissing = 101,
    FieldMissing = 102,
    LayoutMissing = 105,
    InvalidUserPassword = 212,
    RecordInUse = 301,
    /// The modification id sent with an edit does not match the record's
    /// current modification id.
    ModIdMismatch = 306,
    NoRecordsMatch = 401,
    ValueNotUnique = 504,
    ValueRequired = 509,
    UnableToOpenFile = 802,
    InvalidDataApiToken = 952,
    HostCapacityExceeded = 953,
    ParameterMissing = 958,
}
