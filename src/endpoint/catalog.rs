// self
use crate::{
	_prelude::*,
	endpoint::{EndpointDescriptor, EndpointDescriptorError, ZeroResultsPolicy},
};

const MAPS_HOST: &str = "https://maps.googleapis.com";
const ROADS_HOST: &str = "https://roads.googleapis.com";
const GEOLOCATION_HOST: &str = "https://www.googleapis.com";
const ADDRESS_VALIDATION_HOST: &str = "https://addressvalidation.googleapis.com";

/// Immutable set of descriptors for the standard mapping services.
///
/// Construct it once at startup and pass descriptors explicitly to the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointCatalog {
	/// Directions service.
	pub directions: EndpointDescriptor,
	/// Distance matrix service.
	pub distance_matrix: EndpointDescriptor,
	/// Elevation service.
	pub elevation: EndpointDescriptor,
	/// Geocoding and reverse geocoding.
	pub geocode: EndpointDescriptor,
	/// Find place from text.
	pub find_place: EndpointDescriptor,
	/// Nearby place search.
	pub nearby_search: EndpointDescriptor,
	/// Text place search.
	pub text_search: EndpointDescriptor,
	/// Place details.
	pub place_details: EndpointDescriptor,
	/// Place autocomplete.
	pub place_autocomplete: EndpointDescriptor,
	/// Query autocomplete.
	pub query_autocomplete: EndpointDescriptor,
	/// Place photo (binary).
	pub place_photo: EndpointDescriptor,
	/// Static map (binary).
	pub static_map: EndpointDescriptor,
	/// Time zone lookup.
	pub timezone: EndpointDescriptor,
	/// Geolocation (POST).
	pub geolocation: EndpointDescriptor,
	/// Snap-to-roads.
	pub snap_to_roads: EndpointDescriptor,
	/// Nearest roads.
	pub nearest_roads: EndpointDescriptor,
	/// Speed limits.
	pub speed_limits: EndpointDescriptor,
	/// Address validation (POST).
	pub address_validation: EndpointDescriptor,
}
impl EndpointCatalog {
	/// Builds the catalog of production endpoints.
	pub fn standard() -> Result<Self, EndpointDescriptorError> {
		use ZeroResultsPolicy::{Error as Fail, Success};

		Ok(Self {
			directions: maps("directions", "/maps/api/directions/json", Success)?,
			distance_matrix: maps("distance_matrix", "/maps/api/distancematrix/json", Success)?,
			elevation: maps("elevation", "/maps/api/elevation/json", Fail)?,
			geocode: maps("geocode", "/maps/api/geocode/json", Success)?,
			find_place: maps("find_place", "/maps/api/place/findplacefromtext/json", Success)?,
			nearby_search: maps("nearby_search", "/maps/api/place/nearbysearch/json", Success)?,
			text_search: maps("text_search", "/maps/api/place/textsearch/json", Success)?,
			place_details: maps("place_details", "/maps/api/place/details/json", Fail)?,
			place_autocomplete: maps(
				"place_autocomplete",
				"/maps/api/place/autocomplete/json",
				Success,
			)?,
			query_autocomplete: maps(
				"query_autocomplete",
				"/maps/api/place/queryautocomplete/json",
				Success,
			)?,
			place_photo: maps("place_photo", "/maps/api/place/photo", Fail)?,
			static_map: maps("static_map", "/maps/api/staticmap", Fail)?,
			timezone: maps("timezone", "/maps/api/timezone/json", Fail)?,
			geolocation: key_only("geolocation", GEOLOCATION_HOST, "/geolocation/v1/geolocate")?,
			snap_to_roads: key_only("snap_to_roads", ROADS_HOST, "/v1/snapToRoads")?,
			nearest_roads: key_only("nearest_roads", ROADS_HOST, "/v1/nearestRoads")?,
			speed_limits: key_only("speed_limits", ROADS_HOST, "/v1/speedLimits")?,
			address_validation: key_only(
				"address_validation",
				ADDRESS_VALIDATION_HOST,
				"/v1:validateAddress",
			)?,
		})
	}

	/// Iterates every descriptor in the catalog.
	pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
		[
			&self.directions,
			&self.distance_matrix,
			&self.elevation,
			&self.geocode,
			&self.find_place,
			&self.nearby_search,
			&self.text_search,
			&self.place_details,
			&self.place_autocomplete,
			&self.query_autocomplete,
			&self.place_photo,
			&self.static_map,
			&self.timezone,
			&self.geolocation,
			&self.snap_to_roads,
			&self.nearest_roads,
			&self.speed_limits,
			&self.address_validation,
		]
		.into_iter()
	}
}

fn maps(
	name: &str,
	path: &str,
	zero_results: ZeroResultsPolicy,
) -> Result<EndpointDescriptor, EndpointDescriptorError> {
	EndpointDescriptor::builder(name)
		.host(parse_host(name, MAPS_HOST)?)
		.path(path)
		.accepts_enterprise_auth(true)
		.zero_results(zero_results)
		.build()
}

fn key_only(
	name: &str,
	host: &str,
	path: &str,
) -> Result<EndpointDescriptor, EndpointDescriptorError> {
	EndpointDescriptor::builder(name).host(parse_host(name, host)?).path(path).build()
}

fn parse_host(name: &str, host: &str) -> Result<Url, EndpointDescriptorError> {
	Url::parse(host).map_err(|_| EndpointDescriptorError::InsecureHost {
		name: name.to_owned(),
		url: host.to_owned(),
	})
}
