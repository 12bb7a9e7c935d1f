pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::{
    admin, applications, auth, interviews, jobs, matching, notifications, recruiters, social,
    users,
};

pub fn build_router(state: AppState) -> Router {
    // Multipart uploads need headroom over the raw artifact cap.
    let body_limit = DefaultBodyLimit::max(state.config.max_resume_size_bytes + 64 * 1024);

    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::handlers::handle_register))
        .route("/api/auth/login", post(auth::handlers::handle_login))
        .route("/api/auth/logout", post(auth::handlers::handle_logout))
        // Profile & resumes
        .route(
            "/api/users/profile",
            get(users::handlers::handle_get_profile).put(users::handlers::handle_update_profile),
        )
        .route(
            "/api/users/resume/upload",
            post(users::handlers::handle_upload_resume),
        )
        .route("/api/users/resume", get(users::handlers::handle_list_resumes))
        // Job discovery & applications
        .route("/api/jobs/search", get(jobs::handlers::handle_search))
        .route("/api/jobs/:id", get(jobs::handlers::handle_job_detail))
        .route(
            "/api/jobs/:job_id/apply",
            post(applications::handlers::handle_apply),
        )
        .route(
            "/api/applications",
            get(applications::handlers::handle_my_applications),
        )
        .route(
            "/api/applications/:id/track",
            get(applications::handlers::handle_track_application),
        )
        // AI features
        .route(
            "/api/ai/resume-match/:job_id",
            get(matching::handlers::handle_resume_match),
        )
        .route(
            "/api/ai/recommendations",
            get(matching::handlers::handle_recommendations),
        )
        .route(
            "/api/ai/skill-gap/:job_id",
            get(matching::handlers::handle_skill_gap),
        )
        .route(
            "/api/ai/interview-prep/:job_id",
            get(matching::handlers::handle_interview_prep),
        )
        .route(
            "/api/ai/interview-chat/:job_id",
            post(matching::handlers::handle_interview_chat),
        )
        // Recruiter surface
        .route(
            "/api/recruiter/profile",
            get(recruiters::handlers::handle_get_profile)
                .put(recruiters::handlers::handle_update_profile),
        )
        .route(
            "/api/recruiter/jobs",
            post(recruiters::handlers::handle_create_job)
                .get(recruiters::handlers::handle_list_jobs),
        )
        .route(
            "/api/recruiter/jobs/:id",
            put(recruiters::handlers::handle_update_job),
        )
        .route(
            "/api/recruiter/jobs/:id/applicants",
            get(recruiters::handlers::handle_job_applicants),
        )
        .route(
            "/api/recruiter/jobs/:id/applicants/filter",
            get(recruiters::handlers::handle_filter_applicants),
        )
        .route(
            "/api/recruiter/applicants",
            get(recruiters::handlers::handle_all_applicants),
        )
        .route(
            "/api/recruiter/applicants/:application_id/resume/download",
            get(recruiters::handlers::handle_download_resume),
        )
        .route(
            "/api/recruiter/applications/:id/status",
            put(recruiters::handlers::handle_change_status),
        )
        .route(
            "/api/recruiter/analytics",
            get(recruiters::handlers::handle_analytics),
        )
        // Interviews
        .route(
            "/api/interviews/schedule",
            post(interviews::handlers::handle_schedule),
        )
        .route(
            "/api/interviews/upcoming/list",
            get(interviews::handlers::handle_upcoming),
        )
        .route(
            "/api/interviews/:id",
            get(interviews::handlers::handle_get).put(interviews::handlers::handle_update),
        )
        .route(
            "/api/interviews/:id/room",
            post(interviews::handlers::handle_room),
        )
        // Notifications
        .route("/api/notifications", get(notifications::handlers::handle_list))
        .route(
            "/api/notifications/unread-count",
            get(notifications::handlers::handle_unread_count),
        )
        .route(
            "/api/notifications/read-all",
            put(notifications::handlers::handle_mark_all_read),
        )
        .route(
            "/api/notifications/:id/read",
            put(notifications::handlers::handle_mark_read),
        )
        .route("/api/notifications/ws", get(notifications::ws::handle_ws))
        // Social feed
        .route(
            "/api/social/posts",
            post(social::handlers::handle_create_post).get(social::handlers::handle_feed),
        )
        .route(
            "/api/social/posts/explore",
            get(social::handlers::handle_explore),
        )
        .route(
            "/api/social/posts/:id/comment",
            post(social::handlers::handle_add_comment),
        )
        .route(
            "/api/social/posts/:id/comments",
            get(social::handlers::handle_list_comments),
        )
        .route(
            "/api/social/posts/:id/like",
            post(social::handlers::handle_toggle_like),
        )
        .route(
            "/api/social/posts/:id/share",
            post(social::handlers::handle_share_post),
        )
        .route(
            "/api/social/users/:id/follow",
            post(social::handlers::handle_toggle_follow),
        )
        .route(
            "/api/social/users/:id/followers",
            get(social::handlers::handle_followers),
        )
        .route(
            "/api/social/users/:id/following",
            get(social::handlers::handle_following),
        )
        .route(
            "/api/social/users/:id/follow-stats",
            get(social::handlers::handle_follow_stats),
        )
        // Disputes (filing is open to any authenticated user)
        .route("/api/disputes", post(admin::handlers::handle_file_dispute))
        // Admin
        .route("/api/admin/users", get(admin::handlers::handle_list_users))
        .route(
            "/api/admin/users/:id",
            put(admin::handlers::handle_update_user)
                .delete(admin::handlers::handle_deactivate_user),
        )
        .route(
            "/api/admin/recruiters",
            get(admin::handlers::handle_list_recruiters),
        )
        .route(
            "/api/admin/recruiters/:id",
            put(admin::handlers::handle_update_recruiter),
        )
        .route(
            "/api/admin/jobs/pending",
            get(admin::handlers::handle_pending_jobs),
        )
        .route(
            "/api/admin/jobs/:id/approve",
            put(admin::handlers::handle_approve_job),
        )
        .route(
            "/api/admin/analytics",
            get(admin::handlers::handle_platform_analytics),
        )
        .route(
            "/api/admin/disputes",
            get(admin::handlers::handle_list_disputes),
        )
        .route(
            "/api/admin/disputes/:id",
            put(admin::handlers::handle_update_dispute),
        )
        .layer(body_limit)
        .with_state(state)
}
