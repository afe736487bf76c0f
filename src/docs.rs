use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::processing::handler::process_video,
        crate::modules::processing::handler::extract_thumbnail,
    ),
    components(
        schemas(
            crate::modules::processing::dto::ProcessResponse,
            crate::modules::processing::dto::ThumbnailResponse,
            crate::common::response::ErrorBody,
        )
    ),
    tags(
        (name = "Processing", description = "Video processing endpoints")
    )
)]
pub struct ApiDoc;
