//! Writes TypeScript declarations for every API type to `shared/types.ts`
//! (or the path given as the first argument).

use std::{env, fs, path::PathBuf};

use anyhow::Context;
use ts_rs::TS;

fn declarations() -> Vec<String> {
    vec![
        utils::response::ApiResponse::<(), ()>::decl(),
        db::models::user::User::decl(),
        db::models::user::UserProfile::decl(),
        db::models::user::UserSummary::decl(),
        db::models::user::UserSuggestion::decl(),
        db::models::user::UpdateProfile::decl(),
        db::models::post::Post::decl(),
        db::models::post::PostWithStats::decl(),
        db::models::post::CreatePost::decl(),
        db::models::comment::Comment::decl(),
        db::models::comment::CommentWithAuthor::decl(),
        db::models::comment::CreateComment::decl(),
        db::models::follower::Follower::decl(),
        db::models::message::Message::decl(),
        db::models::message::SendMessage::decl(),
        db::models::message::Conversation::decl(),
        db::models::notification::NotificationType::decl(),
        db::models::notification::Notification::decl(),
        db::models::notification::NotificationWithActor::decl(),
        db::models::workspace::Workspace::decl(),
        db::models::workspace::CreateWorkspace::decl(),
        db::models::workspace::UpdateWorkspace::decl(),
        db::models::project::Project::decl(),
        db::models::project::CreateProject::decl(),
        db::models::project::UpdateProject::decl(),
        db::models::list::List::decl(),
        db::models::list::CreateList::decl(),
        db::models::task::TaskPriority::decl(),
        db::models::task::Task::decl(),
        db::models::task::CreateTask::decl(),
        db::models::task::UpdateTask::decl(),
        db::models::activity::EntityType::decl(),
        db::models::activity::Activity::decl(),
        services::services::auth::RegisterRequest::decl(),
        services::services::auth::LoginRequest::decl(),
        services::services::auth::AuthSession::decl(),
        services::services::board::BoardColumn::decl(),
        services::services::board::BoardSnapshot::decl(),
        services::services::social::LikeToggle::decl(),
        services::services::social::UnreadCounts::decl(),
        server::routes::lists::CreateTaskInList::decl(),
        server::routes::tasks::MoveTask::decl(),
    ]
}

fn main() -> anyhow::Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shared/types.ts"));

    let mut out = String::from("// Generated by `cargo run --bin generate_types`. Do not edit.\n\n");
    for decl in declarations() {
        out.push_str("export ");
        out.push_str(&decl);
        out.push_str("\n\n");
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
