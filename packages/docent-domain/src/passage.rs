use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A scored candidate returned by the search layer. Higher scores are more relevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
	pub text: String,
	/// Non-finite scores are written as the strings `"NaN"`, `"inf"`, and `"-inf"`.
	#[serde(with = "score_repr")]
	pub score: f32,
}
impl Passage {
	pub fn new(text: impl Into<String>, score: f32) -> Self {
		Self { text: text.into(), score }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
	Rewrite,
	Direct,
	Fallback,
	Error,
}
impl ResponseType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Rewrite => "rewrite",
			Self::Direct => "direct",
			Self::Fallback => "fallback",
			Self::Error => "error",
		}
	}
}
impl fmt::Display for ResponseType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ResponseType {
	type Err = ParseResponseTypeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"rewrite" => Ok(Self::Rewrite),
			"direct" => Ok(Self::Direct),
			"fallback" => Ok(Self::Fallback),
			"error" => Ok(Self::Error),
			other => Err(ParseResponseTypeError(other.to_string())),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResponseTypeError(pub String);
impl fmt::Display for ParseResponseTypeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Unknown response type {:?}.", self.0)
	}
}
impl std::error::Error for ParseResponseTypeError {}

mod score_repr {
	use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

	const NAN: &str = "NaN";
	const INF: &str = "inf";
	const NEG_INF: &str = "-inf";

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(f32),
		Text(String),
	}

	pub fn serialize<S>(value: &f32, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		if value.is_finite() {
			serializer.serialize_f32(*value)
		} else if value.is_nan() {
			serializer.serialize_str(NAN)
		} else if value.is_sign_positive() {
			serializer.serialize_str(INF)
		} else {
			serializer.serialize_str(NEG_INF)
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<f32, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Raw::deserialize(deserializer)? {
			Raw::Number(value) => Ok(value),
			Raw::Text(text) => match text.as_str() {
				NAN => Ok(f32::NAN),
				INF => Ok(f32::INFINITY),
				NEG_INF => Ok(f32::NEG_INFINITY),
				other => Err(D::Error::custom(format!("Invalid passage score {other:?}."))),
			},
		}
	}
}
