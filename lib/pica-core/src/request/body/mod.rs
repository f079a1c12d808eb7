use headers::ContentType;

use crate::PicaError;
use crate::scope::ParameterBag;

mod form;
pub use self::form::FormUrlEncodedEncoder;

mod json;
pub use self::json::JsonEncoder;

mod multipart;
pub use self::multipart::{MultipartEncoder, MultipartWriter};

/// Prefix marking a multipart parameter value as a local file path.
pub const FILE_SIGIL: char = '@';

/// A request body produced by a [`ContentEncoder`].
#[derive(Clone, derive_more::Debug)]
pub struct EncodedBody {
    /// A `Content-Type` mandated by the encoding, overriding the declared one.
    ///
    /// Only multipart bodies set it, the boundary is part of the header.
    pub content_type: Option<ContentType>,
    /// The body bytes.
    #[debug(ignore)]
    pub data: Vec<u8>,
}

impl EncodedBody {
    /// A body that keeps the declared content type.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            content_type: None,
            data,
        }
    }

    /// An empty body.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Encodes a parameter bag into a request body.
pub trait ContentEncoder {
    /// Encodes every parameter of the bag.
    ///
    /// # Errors
    ///
    /// Fails when the bag cannot be represented in this encoding, or when an
    /// attachment cannot be read.
    fn encode(&self, params: &ParameterBag) -> Result<EncodedBody, PicaError>;
}

/// The body encodings selected by the declared `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
    /// `multipart/form-data`
    Multipart,
    /// `application/json`
    Json,
}

impl BodyEncoding {
    /// Selects the encoding from a `Content-Type` value.
    ///
    /// Only the media type essence is compared, parameters such as `charset`
    /// are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media = content_type.trim().parse::<mime::Mime>().ok()?;
        let (type_, subtype) = (media.type_(), media.subtype());
        if type_ == mime::APPLICATION && subtype == mime::WWW_FORM_URLENCODED {
            Some(Self::FormUrlEncoded)
        } else if type_ == mime::MULTIPART && subtype == mime::FORM_DATA {
            Some(Self::Multipart)
        } else if type_ == mime::APPLICATION && subtype == mime::JSON {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// Encodes the bag with the matching encoder.
    ///
    /// # Errors
    ///
    /// See [`ContentEncoder::encode`].
    pub fn encode(self, params: &ParameterBag) -> Result<EncodedBody, PicaError> {
        match self {
            Self::FormUrlEncoded => FormUrlEncodedEncoder.encode(params),
            Self::Multipart => MultipartEncoder::default().encode(params),
            Self::Json => JsonEncoder.encode(params),
        }
    }
}
