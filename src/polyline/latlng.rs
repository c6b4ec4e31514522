// self
use crate::_prelude::*;

/// Latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
	/// Latitude in degrees.
	pub lat: f64,
	/// Longitude in degrees.
	pub lng: f64,
}
impl LatLng {
	/// Creates a new coordinate pair.
	pub const fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng }
	}
}
impl Display for LatLng {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{},{}", self.lat, self.lng)
	}
}
impl FromStr for LatLng {
	type Err = LatLngParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (lat, lng) = s.split_once(',').ok_or_else(|| LatLngParseError::new(s))?;
		let lat = lat.trim().parse::<f64>().map_err(|_| LatLngParseError::new(s))?;
		let lng = lng.trim().parse::<f64>().map_err(|_| LatLngParseError::new(s))?;

		Ok(Self::new(lat, lng))
	}
}
impl From<(f64, f64)> for LatLng {
	fn from((lat, lng): (f64, f64)) -> Self {
		Self::new(lat, lng)
	}
}

/// Error returned when a `lat,lng` string cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Expected `lat,lng`, got `{input}`.")]
pub struct LatLngParseError {
	/// Rejected input.
	pub input: String,
}
impl LatLngParseError {
	fn new(input: &str) -> Self {
		Self { input: input.to_owned() }
	}
}
