use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leadscope API",
        version = "0.1.0",
        description = "Batch scraper for company contact details and profile signals."
    ),
    paths(crate::routes::scrape, crate::routes::health),
    components(schemas(
        crate::dto::ScrapeRequestBody,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "scrape", description = "Batch scraping"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
