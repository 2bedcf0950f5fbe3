use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{auth::AuthUser, models::Content};

/// Fixed page size for content listings.
pub const PAGE_SIZE: i64 = 10;

/// ContentQuery
///
/// The accepted query parameters for GET /api/content: an optional free-text
/// search term and an optional 1-based page number.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ContentQuery {
    /// Case-insensitive substring matched against title, body, summary, and
    /// categories (OR across fields).
    pub search: Option<String>,
    /// 1-based page number; defaults to the first page.
    pub page: Option<u32>,
}

impl ContentQuery {
    /// The search term after trimming, or None when absent or blank. A blank
    /// term means "no filter", not "match nothing".
    pub fn normalized_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string)
    }

    /// The effective page, clamped to at least 1.
    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// ContentScope
///
/// The visibility predicate of the query engine, resolved once per request
/// from the requester's capability flags and applied unconditionally before
/// any search narrowing. A non-staff requester can never widen this scope,
/// which is what keeps other users' content out of list and search results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentScope {
    /// Staff override: every content row.
    All,
    /// Everyone else: only rows they authored.
    AuthoredBy(Uuid),
}

impl ContentScope {
    pub fn for_requester(user: &AuthUser) -> Self {
        if user.is_staff {
            ContentScope::All
        } else {
            ContentScope::AuthoredBy(user.id)
        }
    }
}

/// can_access
///
/// The single ownership-or-admin predicate shared by detail GET, PUT, and
/// DELETE. Keeping it in one place means the three paths cannot diverge.
/// Callers map a `false` to the same 404 as a missing row, so the response
/// never reveals whether the id exists.
pub fn can_access(user: &AuthUser, content: &Content) -> bool {
    user.is_staff || content.author_id == user.id
}

/// like_pattern
///
/// Builds the `%term%` pattern for an ILIKE comparison. LIKE metacharacters
/// in the term (`\`, `%`, `_`) are escaped first, so the term always matches
/// as a literal substring: searching for "50%" finds rows containing "50%",
/// not every row containing "50".
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{escaped}%")
}

/// PageWindow
///
/// The LIMIT/OFFSET slice corresponding to a page number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

/// page_window
///
/// Translates a 1-based page number into its window. A page beyond the end of
/// the data simply produces an offset past the last row; the store then
/// returns an empty slice, which is the specified behavior (empty page, not
/// an error).
pub fn page_window(page: u32) -> PageWindow {
    let page = page.max(1) as i64;
    PageWindow {
        limit: PAGE_SIZE,
        offset: (page - 1) * PAGE_SIZE,
    }
}

/// page_links
///
/// Computes the next/previous page markers for the pagination envelope given
/// the total matching count. `next` exists only while rows remain past the
/// current window; `previous` exists for every page after the first.
pub fn page_links(page: u32, count: i64) -> (Option<u32>, Option<u32>) {
    let page = page.max(1);
    let next = if (page as i64) * PAGE_SIZE < count {
        Some(page + 1)
    } else {
        None
    };
    let previous = if page > 1 { Some(page - 1) } else { None };
    (next, previous)
}
