//! Mailbox queries: search, message lookup and folder exploration.

use serde::de::DeserializeOwned;
use tracing::debug;
use zimbra_wire::{
    Folder, GetFolderResponse, GetMsgResponse, Message, Namespace, Request, Response,
    SearchResponse, SearchSpec, SortBy, build_query, normalize_message,
};

use crate::config::MAX_SEARCH_LIMIT;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::transport::Transport;

/// Paging and ordering for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Page size. `None` uses the configured default.
    pub limit: Option<u32>,
    /// Number of hits to skip.
    pub offset: u32,
    /// Server-side sort order.
    pub sort_by: SortBy,
    /// Reverse the page before returning it. With the default `DateDesc`
    /// sort this yields the oldest message first.
    pub oldest_first: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            offset: 0,
            sort_by: SortBy::default(),
            oldest_first: true,
        }
    }
}

impl SearchOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size, capped at [`MAX_SEARCH_LIMIT`].
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.min(MAX_SEARCH_LIMIT));
        self
    }

    /// Sets the offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Keeps the server's order instead of reversing it.
    #[must_use]
    pub const fn server_order(mut self) -> Self {
        self.oldest_first = false;
        self
    }
}

fn expect_element<R: DeserializeOwned>(response: &Response, name: &str) -> Result<R> {
    response
        .element(name)?
        .ok_or_else(|| Error::MissingResponse(name.to_string()))
}

impl<T: Transport> Session<T> {
    /// Searches messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails, the response lacks
    /// `SearchResponse`, or a hit cannot be normalized.
    pub async fn search(
        &mut self,
        spec: &SearchSpec,
        options: &SearchOptions,
    ) -> Result<Vec<Message>> {
        let query = build_query(spec);
        let limit = options
            .limit
            .unwrap_or(self.config().search_limit)
            .min(MAX_SEARCH_LIMIT);

        let mut request = Request::new("SearchRequest", Namespace::Mail)
            .attr("types", "message")
            .attr("sortBy", options.sort_by.as_str())
            .attr("fetch", "all")
            .attr("limit", limit)
            .attr("offset", options.offset)
            .text("query", query.as_str());
        if let Some(locale) = &self.config().locale {
            request = request.text("locale", locale.as_str());
        }

        let response = self.call(&request).await?;
        let search: SearchResponse = expect_element(&response, "SearchResponse")?;

        let mut messages = search
            .messages
            .into_iter()
            .map(normalize_message)
            .collect::<zimbra_wire::Result<Vec<_>>>()?;
        if options.oldest_first {
            messages.reverse();
        }

        debug!(
            query = %query,
            hits = messages.len(),
            more = search.more.unwrap_or(false),
            "Search complete"
        );
        Ok(messages)
    }

    /// Lists the messages of a folder, e.g. `/Inbox`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::search`].
    pub async fn folder_messages(
        &mut self,
        path: &str,
        options: &SearchOptions,
    ) -> Result<Vec<Message>> {
        let spec = SearchSpec::new().field("in", path);
        self.search(&spec, options).await
    }

    /// Fetches one message by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingResponse` if the server returns no message.
    pub async fn get_message(&mut self, id: &str) -> Result<Message> {
        let request = Request::new("GetMsgRequest", Namespace::Mail)
            .element("m", serde_json::json!({ "id": id }));

        let response = self.call(&request).await?;
        let found: GetMsgResponse = expect_element(&response, "GetMsgResponse")?;
        let wire = found
            .messages
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingResponse("GetMsgResponse.m".to_string()))?;

        Ok(normalize_message(wire)?)
    }

    /// Returns the folder tree rooted at `path`.
    ///
    /// `depth` limits how many levels of sub-folders are returned; `None`
    /// lets the server return the whole subtree.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingResponse` if the response lacks
    /// `GetFolderResponse` or its folder.
    pub async fn explore(&mut self, path: &str, depth: Option<u32>) -> Result<Folder> {
        let mut request = Request::new("GetFolderRequest", Namespace::Mail)
            .element("folder", serde_json::json!({ "path": path }));
        if let Some(depth) = depth {
            request = request.attr("depth", depth);
        }

        let response = self.call(&request).await?;
        let found: GetFolderResponse = expect_element(&response, "GetFolderResponse")?;

        found
            .folders
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingResponse("GetFolderResponse.folder".to_string()))
    }
}
