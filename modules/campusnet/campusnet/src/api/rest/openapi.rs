//! OpenAPI component schemas for the REST DTOs.

use utoipa::OpenApi;

use super::dto::{
    AdminStatsDto, AdminUsersResponse, AuthResponse, ConnectionDto, ConnectionRequestDto,
    ErrorBody, HealthResponse, LoginRequest, MessageResponse, PaginationDto, PendingRequestDto,
    PreferencesDto, ProfessionalsResponse, RecentUsersResponse, RegisterRequest,
    RemoveConnectionBody, RequestActionBody, SendRequestBody, StatsResponse, StatusResponse,
    UpdatePasswordRequest, UpdateProfileRequest, UserDto, UserResponse, UserSummaryDto,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "CampusNet API", description = "Identity, connections and admin endpoints"),
    components(schemas(
        ErrorBody,
        MessageResponse,
        StatusResponse,
        HealthResponse,
        AuthResponse,
        UserResponse,
        ProfessionalsResponse,
        StatsResponse,
        AdminUsersResponse,
        RecentUsersResponse,
        PaginationDto,
        AdminStatsDto,
        PreferencesDto,
        UserDto,
        UserSummaryDto,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        UpdatePasswordRequest,
        ConnectionRequestDto,
        PendingRequestDto,
        ConnectionDto,
        SendRequestBody,
        RequestActionBody,
        RemoveConnectionBody,
    ))
)]
pub struct ApiDoc;
