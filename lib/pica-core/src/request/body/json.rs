use super::{ContentEncoder, EncodedBody};
use crate::PicaError;
use crate::scope::ParameterBag;

/// Encodes the bag as one compact `application/json` object.
///
/// Values are serialized as they are, an integer stays a JSON number.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl ContentEncoder for JsonEncoder {
    fn encode(&self, params: &ParameterBag) -> Result<EncodedBody, PicaError> {
        let data = serde_json::to_vec(params)?;
        Ok(EncodedBody::new(data))
    }
}
