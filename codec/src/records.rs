//! Bindings for the response records exchanged by the messaging service.
//!
//! These are written the way generated bindings are: public `Option` slots, a static
//! [Schema] per type, typed accessors and [impl_record](crate::impl_record).

use crate::{impl_record, Record, Schema};
use std::{collections::BTreeMap, sync::LazyLock};

/// Status attached to a failed response.
#[derive(Clone, Debug, Default)]
pub struct ErrorInfo {
    /// Required.
    pub code: Option<i32>,
    pub info: Option<String>,
}

static ERROR_INFO: LazyLock<Schema<ErrorInfo>> = LazyLock::new(|| {
    Schema::<ErrorInfo>::builder("ErrorInfo")
        .required(1, "code", |e| &e.code, |e| &mut e.code)
        .optional(2, "info", |e| &e.info, |e| &mut e.info)
        .build()
});

impl Record for ErrorInfo {
    fn schema() -> &'static Schema<Self> {
        &ERROR_INFO
    }
}

impl_record!(ErrorInfo);

impl ErrorInfo {
    pub fn new(code: i32) -> Self {
        Self {
            code: Some(code),
            info: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }
}

/// A key/value entry carried in a response list.
#[derive(Clone, Debug, Default)]
pub struct Node {
    /// Required.
    pub id: Option<String>,
    pub name: Option<String>,
}

static NODE: LazyLock<Schema<Node>> = LazyLock::new(|| {
    Schema::<Node>::builder("Node")
        .required(1, "id", |n| &n.id, |n| &mut n.id)
        .optional(2, "name", |n| &n.name, |n| &mut n.name)
        .build()
});

impl Record for Node {
    fn schema() -> &'static Schema<Self> {
        &NODE
    }
}

impl_record!(Node);

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Reply to a client request.
#[derive(Clone, Debug, Default)]
pub struct Response {
    pub thread_id: Option<String>,
    pub error: Option<ErrorInfo>,
    pub extra_list: Option<Vec<Node>>,
    pub extra_map: Option<BTreeMap<String, String>>,
}

impl Response {
    pub const THREAD_ID: i16 = 1;
    pub const ERROR: i16 = 2;
    pub const EXTRA_LIST: i16 = 3;
    pub const EXTRA_MAP: i16 = 4;
}

static RESPONSE: LazyLock<Schema<Response>> = LazyLock::new(|| {
    Schema::<Response>::builder("Response")
        .optional(
            Response::THREAD_ID,
            "threadId",
            |r| &r.thread_id,
            |r| &mut r.thread_id,
        )
        .optional(Response::ERROR, "error", |r| &r.error, |r| &mut r.error)
        .optional(
            Response::EXTRA_LIST,
            "extraList",
            |r| &r.extra_list,
            |r| &mut r.extra_list,
        )
        .optional(
            Response::EXTRA_MAP,
            "extraMap",
            |r| &r.extra_map,
            |r| &mut r.extra_map,
        )
        .build()
});

impl Record for Response {
    fn schema() -> &'static Schema<Self> {
        &RESPONSE
    }
}

impl_record!(Response);

impl Response {
    // ---------- threadId ----------

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn set_thread_id(&mut self, thread_id: impl Into<String>) -> &mut Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn unset_thread_id(&mut self) {
        self.thread_id = None;
    }

    pub fn is_set_thread_id(&self) -> bool {
        self.thread_id.is_some()
    }

    // ---------- error ----------

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn set_error(&mut self, error: ErrorInfo) -> &mut Self {
        self.error = Some(error);
        self
    }

    pub fn unset_error(&mut self) {
        self.error = None;
    }

    pub fn is_set_error(&self) -> bool {
        self.error.is_some()
    }

    // ---------- extraList ----------

    pub fn extra_list(&self) -> Option<&[Node]> {
        self.extra_list.as_deref()
    }

    pub fn extra_list_size(&self) -> usize {
        self.extra_list.as_ref().map_or(0, Vec::len)
    }

    /// Appends `node`, making the list present if it was absent.
    pub fn add_to_extra_list(&mut self, node: Node) -> &mut Self {
        self.extra_list.get_or_insert_with(Vec::new).push(node);
        self
    }

    pub fn set_extra_list(&mut self, extra_list: Vec<Node>) -> &mut Self {
        self.extra_list = Some(extra_list);
        self
    }

    pub fn unset_extra_list(&mut self) {
        self.extra_list = None;
    }

    pub fn is_set_extra_list(&self) -> bool {
        self.extra_list.is_some()
    }

    // ---------- extraMap ----------

    pub fn extra_map(&self) -> Option<&BTreeMap<String, String>> {
        self.extra_map.as_ref()
    }

    pub fn extra_map_size(&self) -> usize {
        self.extra_map.as_ref().map_or(0, BTreeMap::len)
    }

    /// Inserts an entry, making the map present if it was absent. Replaces any previous
    /// value for `key`.
    pub fn put_to_extra_map(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.extra_map
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn set_extra_map(&mut self, extra_map: BTreeMap<String, String>) -> &mut Self {
        self.extra_map = Some(extra_map);
        self
    }

    pub fn unset_extra_map(&mut self) {
        self.extra_map = None;
    }

    pub fn is_set_extra_map(&self) -> bool {
        self.extra_map.is_some()
    }
}
