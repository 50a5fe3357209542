use super::LeadSource;
use crate::config::PlacesConfig;
use crate::entities::businesses::NO_WEBSITE;
use crate::error::{AppError, AppResult};
use crate::models::ExternalLeadRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,website,rating,user_ratings_total,business_status,types";
// nearbysearch 最多返回 3 页
const MAX_PAGES: usize = 3;
// next_page_token 生效前需要等待
const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    results: Vec<NearbyPlace>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyPlace {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceDetails {
    name: Option<String>,
    formatted_address: Option<String>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<i32>,
    business_status: Option<String>,
    types: Option<Vec<String>>,
}

impl PlaceDetails {
    fn into_record(self, place_id: String) -> ExternalLeadRecord {
        ExternalLeadRecord {
            name: self.name.unwrap_or_default(),
            address: self.formatted_address,
            website: Some(self.website.unwrap_or_else(|| NO_WEBSITE.to_string())),
            phone: Some(self.formatted_phone_number.unwrap_or_else(|| "N/A".to_string())),
            rating: self.rating,
            total_ratings: self.user_ratings_total,
            types: self.types,
            place_id,
            business_status: Some(self.business_status.unwrap_or_else(|| "UNKNOWN".to_string())),
        }
    }
}

/// Google Places 爬虫：地理编码 -> 周边搜索（分页）-> 逐个取详情
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    config: PlacesConfig,
}

impl PlacesClient {
    pub fn new(config: PlacesConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn geocode(&self, location: &str) -> AppResult<LatLng> {
        let response: GeocodeResponse = self
            .client
            .get(self.url("geocode/json"))
            .query(&[("address", location), ("key", self.config.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "OK" {
            return Err(AppError::ExternalApiError(format!(
                "Geocoding failed: {}",
                response.status
            )));
        }

        response
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| AppError::ExternalApiError("Geocoding returned no results".to_string()))
    }

    async fn place_details(&self, place_id: &str) -> AppResult<PlaceDetails> {
        let response: DetailsResponse = self
            .client
            .get(self.url("place/details/json"))
            .query(&[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(response.result.unwrap_or_default())
    }
}

#[async_trait]
impl LeadSource for PlacesClient {
    async fn crawl(
        &self,
        location: &str,
        radius: u32,
        business_type: Option<&str>,
    ) -> AppResult<Vec<ExternalLeadRecord>> {
        if self.config.api_key.is_empty() {
            return Err(AppError::ConfigError("Places API key is not configured".to_string()));
        }

        log::info!("Starting crawl: location={location}, radius={radius}, type={business_type:?}");
        let center = self.geocode(location).await?;
        let center = format!("{},{}", center.lat, center.lng);
        let radius = radius.to_string();

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query: Vec<(&str, &str)> = vec![
                ("location", center.as_str()),
                ("radius", radius.as_str()),
                ("key", self.config.api_key.as_str()),
            ];
            if let Some(t) = business_type.filter(|t| !t.trim().is_empty()) {
                query.push(("type", t));
            }
            if let Some(token) = page_token.as_deref() {
                tokio::time::sleep(PAGE_TOKEN_DELAY).await;
                query.push(("pagetoken", token));
            }

            let page: NearbyResponse = self
                .client
                .get(self.url("place/nearbysearch/json"))
                .query(&query)
                .send()
                .await?
                .json()
                .await?;

            for place in page.results {
                let details = self.place_details(&place.place_id).await?;
                records.push(details.into_record(place.place_id));
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::info!("Crawled {} businesses", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_fill_crawler_defaults() {
        let details: PlaceDetails = serde_json::from_str(
            r#"{"name":"Joe's Pizza","formatted_address":"1 Main St","rating":4.4,"types":["restaurant"]}"#,
        )
        .unwrap();
        let record = details.into_record("p1".to_string());
        assert_eq!(record.website.as_deref(), Some(NO_WEBSITE));
        assert_eq!(record.phone.as_deref(), Some("N/A"));
        assert_eq!(record.business_status.as_deref(), Some("UNKNOWN"));
        assert!(!record.has_website());
        assert_eq!(record.place_id, "p1");
    }

    #[test]
    fn test_details_keep_real_website() {
        let details = PlaceDetails {
            name: Some("Cafe".into()),
            website: Some("https://cafe.example".into()),
            ..Default::default()
        };
        assert!(details.into_record("p2".into()).has_website());
    }
}
