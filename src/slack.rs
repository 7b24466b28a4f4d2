use std::collections::HashMap;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use url::Url;

use crate::models::{
    Conversation, ConversationsListResponse, FileRef, FilesListResponse, HistoryResponse,
    Message, Paging, ResponseMetadata, User, UsersListResponse,
};
use crate::settings::ApiSettings;
use crate::switches::{date_to_slack_ts, date_to_unix, slack_ts_before};
use crate::{AppError, Result};

/// User ID -> display name
pub type UserMap = HashMap<String, String>;

/// Conversation ID -> `@name` or `#name`
pub type ConversationMap = HashMap<String, String>;

/// One page of a cursor-paginated response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, meta: Option<ResponseMetadata>) -> Self {
        Self {
            items,
            next_cursor: meta.and_then(|m| m.next_cursor),
        }
    }
}

/// Keep calling `fetch` with the previous page's cursor until no cursor comes back.
///
/// Slack signals the last page with a missing or empty `next_cursor`. Without
/// `max_pages` there is no bound on the number of calls.
pub fn paginate<T, F>(method: &str, max_pages: Option<usize>, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if let Some(max) = max_pages
            && pages >= max
        {
            return Err(AppError::PaginationLimit {
                method: method.to_string(),
                max_pages: max,
            });
        }

        let page = fetch(cursor.as_deref())?;
        pages += 1;
        tracing::debug!(method, page = pages, items = page.items.len(), "Fetched page");
        all.extend(page.items);

        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(all)
}

pub fn build_user_map(users: Vec<User>) -> UserMap {
    users
        .into_iter()
        .map(|user| {
            let name = user.display_name().to_string();
            (user.id, name)
        })
        .collect()
}

pub fn build_conversation_map(conversations: Vec<Conversation>, users: &UserMap) -> ConversationMap {
    conversations
        .into_iter()
        .map(|conv| {
            let name = conv
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| {
                    let user = conv.user.as_deref()?;
                    Some(users.get(user).cloned().unwrap_or_else(|| user.to_string()))
                })
                .unwrap_or_else(|| conv.id.clone());
            let prefix = if conv.is_im { '@' } else { '#' };
            (conv.id, format!("{}{}", prefix, name))
        })
        .collect()
}

/// Blocking client for the Slack web API methods the archiver needs.
pub struct Api {
    client: reqwest::blocking::Client,
    token: String,
    settings: ApiSettings,
}

impl Api {
    pub fn new(token: &str, settings: ApiSettings) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            token: token.to_string(),
            settings,
        }
    }

    fn call<R: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<R> {
        let url = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), method);
        tracing::debug!(method, ?params, "Calling Slack API");

        let url = Url::parse_with_params(&url, params).map_err(|e| AppError::Http(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http(format!("HTTP {} for {}", status, method)));
        }

        let body: serde_json::Value = response.json()?;
        check_ok(method, &body)?;
        serde_json::from_value(body).map_err(|e| AppError::JsonParse(e.to_string()))
    }

    fn page_params(&self, cursor: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.settings.page_size.to_string())];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        params
    }

    pub fn get_profiles(&self, cursor: Option<&str>) -> Result<Page<User>> {
        let response: UsersListResponse = self.call("users.list", &self.page_params(cursor))?;
        Ok(Page::new(response.members, response.response_metadata))
    }

    pub fn get_conversations(&self, cursor: Option<&str>) -> Result<Page<Conversation>> {
        let mut params = self.page_params(cursor);
        params.push(("types", "public_channel,private_channel,mpim,im".to_string()));
        let response: ConversationsListResponse = self.call("conversations.list", &params)?;
        Ok(Page::new(response.channels, response.response_metadata))
    }

    pub fn get_history_page(
        &self,
        dm: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        cursor: Option<&str>,
    ) -> Result<Page<Message>> {
        let mut params = self.page_params(cursor);
        params.extend(history_params(dm, start, end));
        let response: HistoryResponse = self.call("conversations.history", &params)?;
        Ok(Page::new(response.messages, response.response_metadata))
    }

    /// Full message history of `dm`, newest first as the API returns it.
    pub fn get_conv_history(
        &self,
        dm: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Message>> {
        paginate("conversations.history", self.settings.max_pages, |cursor| {
            self.get_history_page(dm, start, end, cursor)
        })
    }

    pub fn get_user_map(&self) -> Result<UserMap> {
        let users = paginate("users.list", self.settings.max_pages, |cursor| {
            self.get_profiles(cursor)
        })?;
        Ok(build_user_map(users))
    }

    pub fn get_conversation_map(&self, users: &UserMap) -> Result<ConversationMap> {
        let conversations = paginate("conversations.list", self.settings.max_pages, |cursor| {
            self.get_conversations(cursor)
        })?;
        Ok(build_conversation_map(conversations, users))
    }

    /// Every file shared in `dm` between the given dates.
    pub fn get_file_list(
        &self,
        dm: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<FileRef>> {
        paginate_numbered("files.list", self.settings.max_pages, |page| {
            let mut params = vec![
                ("count", self.settings.page_size.to_string()),
                ("page", page.to_string()),
            ];
            params.extend(files_params(dm, start, end));
            let response: FilesListResponse = self.call("files.list", &params)?;
            Ok((response.files, response.paging))
        })
    }
}

/// Like [`paginate`], for methods such as `files.list` that page by number.
///
/// Pages are requested from 1 until the response's `paging` says the last page
/// was reached, or carries no paging at all.
pub fn paginate_numbered<T, F>(
    method: &str,
    max_pages: Option<usize>,
    mut fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Result<(Vec<T>, Option<Paging>)>,
{
    let mut all = Vec::new();
    let mut page = 1u32;
    let mut fetched = 0usize;

    loop {
        if let Some(max) = max_pages
            && fetched >= max
        {
            return Err(AppError::PaginationLimit {
                method: method.to_string(),
                max_pages: max,
            });
        }

        let (items, paging) = fetch(page)?;
        fetched += 1;
        tracing::debug!(method, page, items = items.len(), "Fetched page");
        all.extend(items);

        match paging {
            Some(paging) if paging.page < paging.pages => page = paging.page + 1,
            _ => break,
        }
    }

    Ok(all)
}

/// Date bounds for `conversations.history`: start inclusive, end exclusive.
///
/// Slack treats both `oldest` and `latest` as exclusive unless `inclusive` is
/// set, which would apply to both, so `oldest` is sent just before midnight.
fn history_params(
    dm: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![("channel", dm.to_string())];
    if let Some(start) = start {
        params.push(("oldest", slack_ts_before(start)));
    }
    if let Some(end) = end {
        params.push(("latest", date_to_slack_ts(end)));
    }
    params
}

/// Date bounds for `files.list`. `ts_from` and `ts_to` are both inclusive whole
/// seconds, so the end bound is the last second before `end`.
fn files_params(
    dm: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![("channel", dm.to_string())];
    if let Some(start) = start {
        params.push(("ts_from", date_to_unix(start).to_string()));
    }
    if let Some(end) = end {
        params.push(("ts_to", (date_to_unix(end) - 1).to_string()));
    }
    params
}

fn check_ok(method: &str, body: &serde_json::Value) -> Result<()> {
    if body.get("ok").and_then(|ok| ok.as_bool()) == Some(true) {
        return Ok(());
    }
    let error = body
        .get("error")
        .and_then(|e| e.as_str())
        .unwrap_or("unknown_error")
        .to_string();
    Err(AppError::SlackApi {
        method: method.to_string(),
        error,
    })
}
