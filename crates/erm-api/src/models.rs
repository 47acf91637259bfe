//! API Models

use erm_core::application::dto::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Paginated response
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            per_page: page.page_size,
            total_pages: page.total_pages,
        }
    }
}

/// Acknowledgement for deletes and bulk writes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Affected {
    pub affected: usize,
}

// ============ Scoring ============

/// Score to classify
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ClassifyRequest {
    pub score: f64,
    /// `percent_of_max` or `raw_product`
    #[schema(value_type = String)]
    #[serde(default = "default_scale")]
    pub scale: erm_scoring::RiskScale,
    /// Score is a raw product to convert onto `scale` first
    #[serde(default)]
    pub raw: bool,
}

fn default_scale() -> erm_scoring::RiskScale {
    erm_scoring::RiskScale::RawProduct
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassifyResponse {
    /// Score on the requested scale
    pub score: f64,
    #[schema(value_type = String)]
    pub band: erm_scoring::RiskBand,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct GridRequest {
    pub score: f64,
    /// Overrides the configured tolerance
    pub tolerance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GridResponse {
    pub probability: u8,
    pub impact: u8,
    /// Value the cell stands for
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EffectivenessResponse {
    /// 0..=100
    pub score: f64,
    /// 0..=1
    pub effectiveness: f64,
}

// ============ Query parameters ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessScope {
    pub process_id: Option<erm_core::EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let response: ApiResponse<()> = ApiResponse::error("NOT_FOUND", "risk r-1 not found");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_page_conversion() {
        let page = Page::slice(vec![1, 2, 3], Some(2), Some(2));
        let response = PaginatedResponse::from(page);
        assert_eq!(response.items, vec![3]);
        assert_eq!(response.per_page, 2);
        assert_eq!(response.total_pages, 2);
    }

    #[test]
    fn test_classify_request_defaults() {
        let request: ClassifyRequest = serde_json::from_str(r#"{"score": 12.5}"#).unwrap();
        assert_eq!(request.scale, erm_scoring::RiskScale::RawProduct);
        assert!(!request.raw);
    }
}
