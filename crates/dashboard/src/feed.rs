use std::sync::Arc;

use tokio::sync::watch;

use hireloop_api::models::{CreatePostRequest, FeedPost};
use hireloop_api::ApiClient;
use hireloop_runtime::Scope;

use crate::error::{DashboardError, DashboardResult};
use crate::within;

pub struct FeedView {
    api: ApiClient,
    scope: Scope,
    posts: Arc<watch::Sender<Vec<FeedPost>>>,
}

impl FeedView {
    pub fn new(api: ApiClient) -> Self {
        let (posts, _) = watch::channel(Vec::new());
        Self {
            api,
            scope: Scope::new(),
            posts: Arc::new(posts),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<FeedPost>> {
        self.posts.subscribe()
    }

    pub fn posts(&self) -> Vec<FeedPost> {
        self.posts.borrow().clone()
    }

    pub async fn refresh(&self) -> DashboardResult<()> {
        let posts = within(&self.scope.handle(), self.api.feed()).await?;
        self.posts.send_replace(posts);
        Ok(())
    }

    pub async fn create(&self, content: &str, image: Option<String>) -> DashboardResult<FeedPost> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DashboardError::Invalid("Post content cannot be empty"));
        }

        let request = CreatePostRequest {
            content: content.to_string(),
            image,
        };
        let post = within(&self.scope.handle(), self.api.create_post(&request)).await?;
        self.posts.send_modify(|posts| posts.insert(0, post.clone()));
        Ok(post)
    }

    pub async fn like(&self, post_id: &str) -> DashboardResult<FeedPost> {
        let post = within(&self.scope.handle(), self.api.like_post(post_id)).await?;
        self.posts.send_modify(|posts| {
            if let Some(existing) = posts.iter_mut().find(|existing| existing.id == post.id) {
                *existing = post.clone();
            }
        });
        Ok(post)
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
