use serde::Serialize;

/// Body shared by every endpoint: `{success, message, ...data}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(flatten)]
    pub data: T,
}

/// Payload for envelopes that carry nothing besides `success`/`message`.
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data,
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }
}

impl Envelope<Empty> {
    pub fn done(message: &'static str) -> Self {
        Self::ok(message, Empty {})
    }

    pub fn fail(message: &'static str) -> Self {
        Self {
            success: false,
            message: Some(message),
            data: Empty {},
        }
    }
}
