#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use content_portal::{
    AppState,
    auth::AuthUser,
    config::AppConfig,
    models::{Content, CreateContentRequest, NewUser, UpdateContentRequest, User},
    query::ContentScope,
    repository::{RepoError, Repository},
    storage::MockStorageService,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};
use uuid::Uuid;

// --- In-memory repository ---

// Shared across the test files. Unlike a stub that returns canned values,
// this implements the same filter semantics as the Postgres queries
// (visibility scope first, then case-insensitive substring search, ordered by
// id ascending), so the access-control properties can be exercised end to end
// without a database.
#[derive(Default)]
pub struct MemoryRepo {
    pub users: Mutex<Vec<User>>,
    pub contents: Mutex<Vec<Content>>,
    next_content_id: AtomicI64,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(vec![]),
            contents: Mutex::new(vec![]),
            next_content_id: AtomicI64::new(1),
        }
    }
}

fn in_scope(content: &Content, scope: ContentScope) -> bool {
    match scope {
        ContentScope::All => true,
        ContentScope::AuthoredBy(author_id) => content.author_id == author_id,
    }
}

// Mirrors the ILIKE-across-four-fields narrowing of the SQL path.
fn matches_search(content: &Content, term: &str) -> bool {
    let needle = term.to_lowercase();
    [
        &content.title,
        &content.body,
        &content.summary,
        &content.categories,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn filtered(contents: &[Content], scope: ContentScope, search: Option<&str>) -> Vec<Content> {
    let mut rows: Vec<Content> = contents
        .iter()
        .filter(|c| in_scope(c, scope))
        .filter(|c| search.map(|term| matches_search(c, term)).unwrap_or(true))
        .cloned()
        .collect();
    rows.sort_by_key(|c| c.id);
    rows
}

#[async_trait]
impl Repository for MemoryRepo {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::DuplicateEmail);
        }
        let stored = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            phone: user.phone,
            address: user.address,
            city: user.city,
            state: user.state,
            country: user.country,
            pincode: user.pincode,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_author: user.is_author,
            is_active: true,
            date_joined: Utc::now(),
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn list_content(
        &self,
        scope: ContentScope,
        search: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Vec<Content> {
        let contents = self.contents.lock().unwrap();
        filtered(&contents, scope, search.as_deref())
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect()
    }

    async fn count_content(&self, scope: ContentScope, search: Option<String>) -> i64 {
        let contents = self.contents.lock().unwrap();
        filtered(&contents, scope, search.as_deref()).len() as i64
    }

    async fn get_content(&self, id: i64) -> Option<Content> {
        self.contents
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    async fn create_content(
        &self,
        author_id: Uuid,
        req: CreateContentRequest,
    ) -> Result<Content, RepoError> {
        let now = Utc::now();
        let content = Content {
            id: self.next_content_id.fetch_add(1, Ordering::SeqCst),
            author_id,
            title: req.title,
            body: req.body,
            summary: req.summary,
            categories: req.categories,
            document: req.document,
            created_at: now,
            updated_at: now,
        };
        self.contents.lock().unwrap().push(content.clone());
        Ok(content)
    }

    async fn update_content(&self, id: i64, req: UpdateContentRequest) -> Option<Content> {
        let mut contents = self.contents.lock().unwrap();
        let content = contents.iter_mut().find(|c| c.id == id)?;
        if let Some(title) = req.title {
            content.title = title;
        }
        if let Some(body) = req.body {
            content.body = body;
        }
        if let Some(summary) = req.summary {
            content.summary = summary;
        }
        if let Some(categories) = req.categories {
            content.categories = categories;
        }
        if let Some(document) = req.document {
            content.document = Some(document);
        }
        content.updated_at = Utc::now();
        Some(content.clone())
    }

    async fn delete_content(&self, id: i64) -> Option<Content> {
        let mut contents = self.contents.lock().unwrap();
        let index = contents.iter().position(|c| c.id == id)?;
        Some(contents.remove(index))
    }
}

// --- Test state assembly ---

// Builds an AppState around the shared in-memory repository and a mock
// storage handle. The returned MockStorageService clone shares its
// deleted-keys record with the one inside the state, so tests can observe
// the post-delete hook.
pub fn test_state(repo: Arc<MemoryRepo>) -> (AppState, MockStorageService) {
    let storage = MockStorageService::new();
    let state = AppState {
        repo,
        storage: Arc::new(storage.clone()),
        config: AppConfig::default(),
    };
    (state, storage)
}

// --- Seed helpers ---

pub async fn seed_user(repo: &MemoryRepo, email: &str, is_staff: bool) -> User {
    repo.create_user(NewUser {
        email: email.to_string(),
        password_hash: "x".to_string(),
        full_name: "Test User".to_string(),
        phone: "1234567890".to_string(),
        address: None,
        city: None,
        state: None,
        country: None,
        pincode: "123456".to_string(),
        is_staff,
        is_superuser: is_staff,
        is_author: !is_staff,
    })
    .await
    .expect("seed user")
}

pub fn as_requester(user: &User) -> AuthUser {
    AuthUser {
        id: user.id,
        is_staff: user.is_staff,
        is_author: user.is_author,
    }
}

pub async fn seed_content(repo: &MemoryRepo, author: &User, title: &str) -> Content {
    seed_content_full(repo, author, title, "Body text.", "Summary", "general", None).await
}

pub async fn seed_content_full(
    repo: &MemoryRepo,
    author: &User,
    title: &str,
    body: &str,
    summary: &str,
    categories: &str,
    document: Option<&str>,
) -> Content {
    repo.create_content(
        author.id,
        CreateContentRequest {
            title: title.to_string(),
            body: body.to_string(),
            summary: summary.to_string(),
            categories: categories.to_string(),
            document: document.map(str::to_string),
        },
    )
    .await
    .expect("seed content")
}
