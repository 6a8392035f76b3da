//! Posts, likes, comments, follows, direct messages and notifications.

use db::models::{
    comment::{Comment, CommentWithAuthor},
    follower::Follower,
    is_foreign_key_violation, is_unique_violation,
    like::Like,
    message::{Conversation, Message, SendMessage},
    notification::{Notification, NotificationType, NotificationWithActor},
    post::{CreatePost, Post, PostWithStats},
    user::{UpdateProfile, User, UserSuggestion, UserSummary},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};
use ts_rs::TS;

const SUGGESTION_LIMIT: i64 = 10;
const SEARCH_LIMIT: i64 = 10;
const NOTIFICATION_PAGE_SIZE: i64 = 20;

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Post not found")]
    PostNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Unauthorized or post not found")]
    NotPostOwner,
    #[error("Already following")]
    AlreadyFollowing,
    #[error("Cannot follow yourself")]
    SelfFollow,
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq)]
pub struct UnreadCounts {
    pub notifications: i64,
    pub messages: i64,
}

/// Records a notification without failing the action that caused it.
async fn notify(
    pool: &SqlitePool,
    recipient: i64,
    actor: i64,
    kind: NotificationType,
    entity_id: Option<i64>,
) {
    if let Err(e) = Notification::create(pool, recipient, actor, kind, entity_id).await {
        warn!(recipient, actor, %kind, "Failed to record notification: {}", e);
    }
}

pub struct SocialService;

impl SocialService {
    pub async fn feed(pool: &SqlitePool, viewer_id: i64) -> Result<Vec<PostWithStats>, SocialError> {
        Ok(Post::find_feed(pool, viewer_id).await?)
    }

    pub async fn create_post(
        pool: &SqlitePool,
        user_id: i64,
        data: &CreatePost,
    ) -> Result<Post, SocialError> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        if blank(&data.content) && blank(&data.image_url) {
            return Err(SocialError::Validation(
                "Post needs content or an image".to_string(),
            ));
        }
        let post = Post::create(pool, user_id, data).await?;
        info!(post_id = post.id, user_id, "Created post");
        Ok(post)
    }

    async fn existing_post(pool: &SqlitePool, post_id: i64) -> Result<Post, SocialError> {
        Post::find_by_id(pool, post_id)
            .await?
            .ok_or(SocialError::PostNotFound)
    }

    /// Likes the post, or removes the like when one already exists.
    pub async fn toggle_like(
        pool: &SqlitePool,
        user_id: i64,
        post_id: i64,
    ) -> Result<LikeToggle, SocialError> {
        let post = Self::existing_post(pool, post_id).await?;

        let liked = if Like::exists(pool, post_id, user_id).await? {
            Like::delete(pool, post_id, user_id).await?;
            false
        } else {
            if Like::create(pool, post_id, user_id).await? {
                notify(pool, post.user_id, user_id, NotificationType::Like, Some(post_id)).await;
            }
            true
        };

        let likes_count = Like::count_for_post(pool, post_id).await?;
        debug!(post_id, user_id, liked, likes_count, "Toggled like");
        Ok(LikeToggle { liked, likes_count })
    }

    pub async fn add_comment(
        pool: &SqlitePool,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<Comment, SocialError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SocialError::Validation("Comment is empty".to_string()));
        }
        let post = Self::existing_post(pool, post_id).await?;
        let comment = Comment::create(pool, post_id, user_id, content).await?;
        notify(pool, post.user_id, user_id, NotificationType::Comment, Some(post_id)).await;
        Ok(comment)
    }

    pub async fn comments(
        pool: &SqlitePool,
        post_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, SocialError> {
        Ok(Comment::find_by_post_id(pool, post_id).await?)
    }

    /// Deletes an owned post together with its likes, comments and the
    /// notifications pointing at it. Nothing is removed when `user_id` is not
    /// the author.
    pub async fn delete_post(
        pool: &SqlitePool,
        user_id: i64,
        post_id: i64,
    ) -> Result<(), SocialError> {
        let mut tx = pool.begin().await?;
        Like::delete_by_post_id(&mut *tx, post_id).await?;
        Comment::delete_by_post_id(&mut *tx, post_id).await?;
        Notification::delete_for_post(&mut *tx, post_id).await?;
        if Post::delete_owned(&mut *tx, post_id, user_id).await? == 0 {
            tx.rollback().await?;
            return Err(SocialError::NotPostOwner);
        }
        tx.commit().await?;

        info!(post_id, user_id, "Deleted post");
        Ok(())
    }

    pub async fn follow(
        pool: &SqlitePool,
        follower_id: i64,
        following_id: i64,
    ) -> Result<Follower, SocialError> {
        if follower_id == following_id {
            return Err(SocialError::SelfFollow);
        }
        let follower = Follower::create(pool, follower_id, following_id)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    SocialError::AlreadyFollowing
                } else if is_foreign_key_violation(&e) {
                    SocialError::UserNotFound
                } else {
                    SocialError::Database(e)
                }
            })?;
        notify(pool, following_id, follower_id, NotificationType::Follow, None).await;
        Ok(follower)
    }

    pub async fn suggestions(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<UserSuggestion>, SocialError> {
        Ok(User::suggestions(pool, user_id, SUGGESTION_LIMIT).await?)
    }

    /// An empty query matches nobody.
    pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<UserSummary>, SocialError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(User::search(pool, query, SEARCH_LIMIT).await?)
    }

    pub async fn update_profile(
        pool: &SqlitePool,
        user_id: i64,
        data: &UpdateProfile,
    ) -> Result<User, SocialError> {
        if !User::update_profile(pool, user_id, data).await? {
            return Err(SocialError::UserNotFound);
        }
        User::find_by_id(pool, user_id)
            .await?
            .ok_or(SocialError::UserNotFound)
    }

    pub async fn send_message(
        pool: &SqlitePool,
        sender_id: i64,
        data: &SendMessage,
    ) -> Result<Message, SocialError> {
        let content = data.content.trim();
        if content.is_empty() {
            return Err(SocialError::Validation("Message is empty".to_string()));
        }
        Message::create(pool, sender_id, data.receiver_id, content)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    SocialError::UserNotFound
                } else {
                    SocialError::Database(e)
                }
            })
    }

    /// Returns the thread with `other_id` after marking what they sent as read.
    pub async fn read_thread(
        pool: &SqlitePool,
        user_id: i64,
        other_id: i64,
    ) -> Result<Vec<Message>, SocialError> {
        Message::mark_read_from(pool, other_id, user_id).await?;
        Ok(Message::find_thread(pool, user_id, other_id).await?)
    }

    pub async fn conversations(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Conversation>, SocialError> {
        Ok(Message::find_conversations(pool, user_id).await?)
    }

    /// Marks every notification read, then returns the newest page.
    pub async fn read_notifications(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<NotificationWithActor>, SocialError> {
        Notification::mark_all_read(pool, user_id).await?;
        Ok(Notification::find_recent(pool, user_id, NOTIFICATION_PAGE_SIZE).await?)
    }

    pub async fn unread_counts(pool: &SqlitePool, user_id: i64) -> Result<UnreadCounts, SocialError> {
        Ok(UnreadCounts {
            notifications: Notification::unread_count(pool, user_id).await?,
            messages: Message::unread_count(pool, user_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;

    fn text_post(content: &str) -> CreatePost {
        CreatePost {
            content: Some(content.to_string()),
            image_url: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn liking_twice_toggles_and_notifies_once() {
        let pool = test_support::pool().await;
        let author = test_support::user(&pool, "author").await;
        let fan = test_support::user(&pool, "fan").await;
        let post = SocialService::create_post(&pool, author, &text_post("hello"))
            .await
            .unwrap();

        let first = SocialService::toggle_like(&pool, fan, post.id).await.unwrap();
        assert_eq!(first, LikeToggle { liked: true, likes_count: 1 });
        let feed = SocialService::feed(&pool, fan).await.unwrap();
        assert!(feed[0].user_liked);

        let second = SocialService::toggle_like(&pool, fan, post.id).await.unwrap();
        assert_eq!(second, LikeToggle { liked: false, likes_count: 0 });

        let counts = SocialService::unread_counts(&pool, author).await.unwrap();
        assert_eq!(counts.notifications, 1);
    }

    #[tokio::test]
    async fn self_actions_do_not_notify() {
        let pool = test_support::pool().await;
        let me = test_support::user(&pool, "me").await;
        let post = SocialService::create_post(&pool, me, &text_post("mine"))
            .await
            .unwrap();
        SocialService::toggle_like(&pool, me, post.id).await.unwrap();
        SocialService::add_comment(&pool, me, post.id, "nice").await.unwrap();

        let counts = SocialService::unread_counts(&pool, me).await.unwrap();
        assert_eq!(counts.notifications, 0);
    }

    #[tokio::test]
    async fn unread_counts_reach_zero_after_reading() {
        let pool = test_support::pool().await;
        let a = test_support::user(&pool, "a").await;
        let b = test_support::user(&pool, "b").await;

        SocialService::follow(&pool, b, a).await.unwrap();
        for text in ["hi", "you there?"] {
            SocialService::send_message(
                &pool,
                b,
                &SendMessage {
                    receiver_id: a,
                    content: text.into(),
                },
            )
            .await
            .unwrap();
        }
        assert_eq!(
            SocialService::unread_counts(&pool, a).await.unwrap(),
            UnreadCounts {
                notifications: 1,
                messages: 2
            }
        );

        let notifications = SocialService::read_notifications(&pool, a).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].actor_username, "b");
        assert!(notifications[0].notification.is_read);

        let thread = SocialService::read_thread(&pool, a, b).await.unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].content, "hi");

        assert_eq!(
            SocialService::unread_counts(&pool, a).await.unwrap(),
            UnreadCounts {
                notifications: 0,
                messages: 0
            }
        );
        // Reading the thread does not touch what `a` sent to `b`.
        assert_eq!(SocialService::unread_counts(&pool, b).await.unwrap().messages, 0);
    }

    #[tokio::test]
    async fn following_rules() {
        let pool = test_support::pool().await;
        let a = test_support::user(&pool, "a").await;
        let b = test_support::user(&pool, "b").await;

        SocialService::follow(&pool, a, b).await.unwrap();
        assert!(matches!(
            SocialService::follow(&pool, a, b).await,
            Err(SocialError::AlreadyFollowing)
        ));
        assert!(matches!(
            SocialService::follow(&pool, a, a).await,
            Err(SocialError::SelfFollow)
        ));
        assert!(matches!(
            SocialService::follow(&pool, a, 9_999).await,
            Err(SocialError::UserNotFound)
        ));
        assert!(SocialService::suggestions(&pool, a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_the_author_can_delete_a_post() {
        let pool = test_support::pool().await;
        let author = test_support::user(&pool, "author").await;
        let other = test_support::user(&pool, "other").await;
        let post = SocialService::create_post(&pool, author, &text_post("bye"))
            .await
            .unwrap();
        SocialService::toggle_like(&pool, other, post.id).await.unwrap();
        SocialService::add_comment(&pool, other, post.id, "first").await.unwrap();

        let denied = SocialService::delete_post(&pool, other, post.id).await;
        assert!(matches!(denied, Err(SocialError::NotPostOwner)));
        assert_eq!(SocialService::comments(&pool, post.id).await.unwrap().len(), 1);
        assert_eq!(Like::count_for_post(&pool, post.id).await.unwrap(), 1);

        SocialService::delete_post(&pool, author, post.id).await.unwrap();
        assert!(SocialService::feed(&pool, author).await.unwrap().is_empty());
        assert!(SocialService::comments(&pool, post.id).await.unwrap().is_empty());
        assert_eq!(
            SocialService::unread_counts(&pool, author).await.unwrap().notifications,
            0
        );
    }

    #[tokio::test]
    async fn empty_search_returns_nothing() {
        let pool = test_support::pool().await;
        test_support::user(&pool, "someone").await;
        assert!(SocialService::search(&pool, "  ").await.unwrap().is_empty());
        assert_eq!(SocialService::search(&pool, "some").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn conversations_list_latest_message_per_partner() {
        let pool = test_support::pool().await;
        let me = test_support::user(&pool, "me").await;
        let x = test_support::user(&pool, "x").await;
        let y = test_support::user(&pool, "y").await;
        let send = |from: i64, to: i64, text: &'static str| {
            let pool = pool.clone();
            async move {
                SocialService::send_message(
                    &pool,
                    from,
                    &SendMessage {
                        receiver_id: to,
                        content: text.into(),
                    },
                )
                .await
                .unwrap()
            }
        };
        send(me, x, "to x").await;
        send(y, me, "from y").await;
        send(x, me, "x replies").await;

        let conversations = SocialService::conversations(&pool, me).await.unwrap();
        let summary: Vec<(&str, &str)> = conversations
            .iter()
            .map(|c| (c.username.as_str(), c.last_message.as_str()))
            .collect();
        assert_eq!(summary, vec![("x", "x replies"), ("y", "from y")]);
    }

    #[tokio::test]
    async fn actions_on_missing_posts_fail() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool, "u").await;
        assert!(matches!(
            SocialService::toggle_like(&pool, user, 42).await,
            Err(SocialError::PostNotFound)
        ));
        assert!(matches!(
            SocialService::add_comment(&pool, user, 42, "hi").await,
            Err(SocialError::PostNotFound)
        ));
    }
}
