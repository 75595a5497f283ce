/// `GET /v1/health`
pub async fn health() -> &'static str {
    "OK"
}
