use serde_json::Value;

use crate::{EmbedError, EmbedResult};

/// The two response shapes the embedding service produces.
///
/// There is no discriminant field on the wire; the top-level JSON shape is
/// the tag. Anything else fails closed.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingPayload {
    /// Top-level array: the embedding itself.
    Flat(Vec<f32>),
    /// Top-level object: `{"data": [{"embedding": [...]}]}`.
    Wrapped(Vec<f32>),
}

impl EmbeddingPayload {
    pub fn decode(body: Value) -> EmbedResult<Self> {
        match body {
            Value::Array(elements) => Ok(Self::Flat(decode_bare_vector(elements)?)),
            Value::Object(mut fields) => {
                let data = fields
                    .remove("data")
                    .ok_or(EmbedError::MissingField("data"))?;

                let record = match data {
                    Value::Array(mut records) if !records.is_empty() => records.swap_remove(0),
                    _ => return Err(EmbedError::MissingField("data[0]")),
                };

                let embedding = match record {
                    Value::Object(mut record) => record
                        .remove("embedding")
                        .ok_or(EmbedError::MissingField("embedding"))?,
                    _ => return Err(EmbedError::MissingField("embedding")),
                };

                match embedding {
                    Value::Array(elements) => Ok(Self::Wrapped(decode_elements(elements)?)),
                    _ => Err(EmbedError::InvalidResponse),
                }
            }
            _ => Err(EmbedError::InvalidResponse),
        }
    }

    pub fn into_vector(self) -> Vec<f32> {
        match self {
            Self::Flat(vector) | Self::Wrapped(vector) => vector,
        }
    }
}

/// A bare top-level vector must lead with a float; an all-integer body is a
/// service answering in some other dialect and is rejected. Empty is fine.
fn decode_bare_vector(elements: Vec<Value>) -> EmbedResult<Vec<f32>> {
    match elements.first() {
        None => return Ok(Vec::new()),
        Some(Value::Number(first)) if first.is_f64() => {}
        Some(_) => return Err(EmbedError::InvalidResponse),
    }

    decode_elements(elements)
}

fn decode_elements(elements: Vec<Value>) -> EmbedResult<Vec<f32>> {
    elements
        .into_iter()
        .map(|element| {
            element
                .as_f64()
                .map(|f| f as f32)
                .ok_or(EmbedError::InvalidResponse)
        })
        .collect()
}
