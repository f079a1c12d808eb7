use super::{ContentEncoder, EncodedBody};
use crate::scope::ParameterBag;
use crate::{PicaError, coerce};

/// Encodes the bag as `application/x-www-form-urlencoded`.
///
/// Every value goes through [`coerce`], so the bag may only hold integers and strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormUrlEncodedEncoder;

impl ContentEncoder for FormUrlEncodedEncoder {
    fn encode(&self, params: &ParameterBag) -> Result<EncodedBody, PicaError> {
        let pairs = params
            .iter()
            .map(|(key, value)| (key.as_str(), coerce(value)))
            .collect::<Vec<_>>();
        let data = serde_urlencoded::to_string(pairs)?.into_bytes();

        Ok(EncodedBody::new(data))
    }
}
