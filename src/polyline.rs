//! Encoded Polyline Algorithm Format codec.
//!
//! Coordinates are scaled by `1e5`, rounded half away from zero, delta-encoded against the
//! previous point, zigzag-mapped to unsigned values, and emitted as 5-bit little-endian
//! groups offset by 63 so every character lands in `63..=126`. The format is lossy at the
//! `1e-5` degree resolution.

mod latlng;

pub use latlng::*;

// self
use crate::_prelude::*;

const PRECISION: f64 = 1e5;
const CHAR_OFFSET: u8 = 63;
const CONTINUATION: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;

/// Errors raised while decoding a malformed polyline.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PolylineError {
	/// A byte fell outside the `63..=126` alphabet.
	#[error("Invalid polyline character {byte:#04x} at offset {offset}.")]
	InvalidCharacter {
		/// Offending byte.
		byte: u8,
		/// Byte offset into the input.
		offset: usize,
	},
	/// Input ended inside a group run.
	#[error("Polyline ended in the middle of a value.")]
	Truncated,
	/// Input ended after a latitude without its longitude.
	#[error("Polyline ended after a latitude without a longitude.")]
	MissingLongitude,
	/// A value or running coordinate exceeded 64 bits.
	#[error("Polyline value overflows a 64-bit accumulator.")]
	Overflow,
	/// A coordinate is NaN, infinite, or too large to scale into 64 bits.
	#[error("Coordinate at index {index} cannot be encoded.")]
	UnencodableCoordinate {
		/// Position of the offending point.
		index: usize,
	},
}

/// Opaque encoded representation of an ordered coordinate sequence.
///
/// Serializes as the `{"points": "..."}` object used on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polyline {
	points: String,
}
impl Polyline {
	/// Encodes `points` into a polyline.
	pub fn encode(points: &[LatLng]) -> Result<Self, PolylineError> {
		Ok(Self { points: encode(points)? })
	}

	/// Decodes the polyline back into coordinates.
	pub fn decode(&self) -> Result<Vec<LatLng>, PolylineError> {
		decode(&self.points)
	}

	/// Returns the encoded text.
	pub fn as_str(&self) -> &str {
		&self.points
	}

	/// Renders the polyline as an `enc:`-prefixed path parameter.
	pub fn to_path_param(&self) -> String {
		format!("enc:{}", self.points)
	}

	/// Returns `true` for the empty polyline.
	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}
}
impl AsRef<str> for Polyline {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
impl Display for Polyline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.points)
	}
}
impl FromStr for Polyline {
	type Err = PolylineError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		decode(s)?;

		Ok(Self { points: s.to_owned() })
	}
}

/// Encodes `points` into polyline text.
///
/// Fails on non-finite coordinates and on deltas that do not fit in 64 bits, so every
/// successful result decodes without overflow.
pub fn encode(points: &[LatLng]) -> Result<String, PolylineError> {
	let mut buf = String::with_capacity(points.len() * 8);
	let (mut prev_lat, mut prev_lng) = (0_i64, 0_i64);

	for (index, point) in points.iter().enumerate() {
		let lat = scale(point.lat).ok_or(PolylineError::UnencodableCoordinate { index })?;
		let lng = scale(point.lng).ok_or(PolylineError::UnencodableCoordinate { index })?;

		write_value(&mut buf, lat.checked_sub(prev_lat).ok_or(PolylineError::Overflow)?);
		write_value(&mut buf, lng.checked_sub(prev_lng).ok_or(PolylineError::Overflow)?);

		prev_lat = lat;
		prev_lng = lng;
	}

	Ok(buf)
}

/// Decodes polyline text into coordinates.
///
/// The empty string decodes to an empty sequence.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>, PolylineError> {
	let bytes = encoded.as_bytes();
	let mut offset = 0;
	let mut points = Vec::with_capacity(bytes.len() / 4);
	let (mut lat, mut lng) = (0_i64, 0_i64);

	while offset < bytes.len() {
		let dlat = read_value(bytes, &mut offset)?;

		if offset >= bytes.len() {
			return Err(PolylineError::MissingLongitude);
		}

		let dlng = read_value(bytes, &mut offset)?;

		lat = lat.checked_add(dlat).ok_or(PolylineError::Overflow)?;
		lng = lng.checked_add(dlng).ok_or(PolylineError::Overflow)?;

		points.push(LatLng::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
	}

	Ok(points)
}

fn scale(degrees: f64) -> Option<i64> {
	// `f64::round` rounds half away from zero.
	let scaled = (degrees * PRECISION).round();

	// `i64::MAX as f64` is 2^63, one past the largest representable value.
	(scaled.is_finite() && scaled >= i64::MIN as f64 && scaled < i64::MAX as f64)
		.then_some(scaled as i64)
}

fn write_value(buf: &mut String, delta: i64) {
	// Zigzag is a bijection over `i64`, so the shifted-out sign bit is recovered on decode.
	let mut value = ((delta << 1) ^ (delta >> 63)) as u64;

	while value >= CONTINUATION {
		buf.push(char::from(((CONTINUATION | (value & CHUNK_MASK)) as u8) + CHAR_OFFSET));

		value >>= 5;
	}

	buf.push(char::from(value as u8 + CHAR_OFFSET));
}

fn read_value(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
	let mut result = 0_u64;
	let mut shift = 0_u32;

	loop {
		let byte = *bytes.get(*offset).ok_or(PolylineError::Truncated)?;

		if !(CHAR_OFFSET..=126).contains(&byte) {
			return Err(PolylineError::InvalidCharacter { byte, offset: *offset });
		}
		if shift >= u64::BITS {
			return Err(PolylineError::Overflow);
		}

		*offset += 1;

		let chunk = u64::from(byte - CHAR_OFFSET);

		result |= (chunk & CHUNK_MASK) << shift;
		shift += 5;

		if chunk & CONTINUATION == 0 {
			break;
		}
	}

	let magnitude = (result >> 1) as i64;

	Ok(if result & 1 == 1 { !magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn published_points() -> Vec<LatLng> {
		vec![LatLng::new(38.5, -120.2), LatLng::new(40.7, -120.95), LatLng::new(43.252, -126.453)]
	}

	fn assert_close(actual: &[LatLng], expected: &[LatLng]) {
		assert_eq!(actual.len(), expected.len());

		for (a, e) in actual.iter().zip(expected) {
			assert!((a.lat - e.lat).abs() <= 1e-5, "lat {} vs {}", a.lat, e.lat);
			assert!((a.lng - e.lng).abs() <= 1e-5, "lng {} vs {}", a.lng, e.lng);
		}
	}

	#[test]
	fn encodes_published_example() {
		assert_eq!(
			encode(&published_points()).expect("Published points should encode."),
			"_p~iF~ps|U_ulLnnqC_mqNvxq`@"
		);
	}

	#[test]
	fn decodes_published_example() {
		let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").expect("Published polyline should decode.");

		assert_close(&points, &published_points());
	}

	#[test]
	fn empty_round_trip() {
		assert_eq!(encode(&[]), Ok(String::new()));
		assert_eq!(decode(""), Ok(Vec::new()));
		assert!(Polyline::encode(&[]).expect("Empty input should encode.").is_empty());
	}

	#[test]
	fn round_trip_stays_within_precision() {
		let points = vec![
			LatLng::new(-33.8674869, 151.2069902),
			LatLng::new(-33.8674869, 151.2069902),
			LatLng::new(89.999999, -179.999999),
			LatLng::new(-89.999999, 179.999999),
			LatLng::new(0.0, 0.0),
			LatLng::new(1.234564, -0.000014),
		];
		let polyline = Polyline::encode(&points).expect("Valid coordinates should encode.");

		assert!(polyline.as_str().bytes().all(|b| (63..=126).contains(&b)));
		assert_close(&polyline.decode().expect("Encoded polyline should decode."), &points);
	}

	#[test]
	fn rejects_malformed_input() {
		assert_eq!(
			decode("_p~iF ~ps|U"),
			Err(PolylineError::InvalidCharacter { byte: b' ', offset: 5 })
		);
		// `_` carries the continuation bit, so the value never terminates.
		assert_eq!(decode("_p~iF~ps|_"), Err(PolylineError::Truncated));
		assert_eq!(decode("_p~iF"), Err(PolylineError::MissingLongitude));
		assert_eq!(decode(&"_".repeat(14)), Err(PolylineError::Overflow));
	}

	#[test]
	fn rejects_unencodable_coordinates_without_panicking() {
		assert_eq!(
			encode(&[LatLng::new(f64::INFINITY, 0.0), LatLng::new(f64::NEG_INFINITY, 0.0)]),
			Err(PolylineError::UnencodableCoordinate { index: 0 })
		);
		assert_eq!(
			encode(&[LatLng::new(0.0, 0.0), LatLng::new(1.0, f64::NAN)]),
			Err(PolylineError::UnencodableCoordinate { index: 1 })
		);
		assert_eq!(
			encode(&[LatLng::new(1e300, 0.0)]),
			Err(PolylineError::UnencodableCoordinate { index: 0 })
		);
		assert_eq!(
			encode(&[LatLng::new(9e13, 0.0), LatLng::new(-9e13, 0.0)]),
			Err(PolylineError::Overflow)
		);
	}

	#[test]
	fn extreme_deltas_survive_zigzag() {
		let points = [LatLng::new(9e13, -9e13), LatLng::new(-2e12, 2e12), LatLng::new(0.0, 0.0)];
		let encoded = encode(&points).expect("In-range deltas should encode.");
		let decoded = decode(&encoded).expect("Encoded deltas should decode.");

		assert_eq!(decoded, points);
	}

	#[test]
	fn polyline_serde_uses_points_field() {
		let polyline = Polyline::encode(&published_points()).expect("Published points should encode.");
		let json = serde_json::to_string(&polyline).expect("Polyline should serialize.");

		assert_eq!(json, r#"{"points":"_p~iF~ps|U_ulLnnqC_mqNvxq`@"}"#);

		let back: Polyline = serde_json::from_str(&json).expect("Polyline should deserialize.");

		assert_eq!(back, polyline);
		assert_eq!(back.to_path_param(), "enc:_p~iF~ps|U_ulLnnqC_mqNvxq`@");
	}

	#[test]
	fn from_str_validates() {
		assert!("_p~iF~ps|U".parse::<Polyline>().is_ok());
		assert!("_p~iF".parse::<Polyline>().is_err());
	}
}
