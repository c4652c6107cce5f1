//! Subcommand implementations.

use anyhow::{Context, Result};
use anydesk_core::{
    AuthRequest, ClientDetailRequest, ClientListRequest, DebugSnapshot, Endpoint, ListEndpoint,
    Pagination, SessionCommentRequest, SessionDirection, SessionListRequest, SortOrder,
    SysinfoRequest, Transport, UNBOUNDED,
};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

/// Sort direction of a listing
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Ascending,
            Order::Desc => SortOrder::Descending,
        }
    }
}

/// Which sessions of a client to list
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Direction {
    In,
    Out,
    Inout,
}

impl From<Direction> for SessionDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::In => SessionDirection::Incoming,
            Direction::Out => SessionDirection::Outgoing,
            Direction::Inout => SessionDirection::Both,
        }
    }
}

/// Paging options shared by list commands
#[derive(Args, Debug)]
pub struct PageArgs {
    /// Index of the first item
    #[arg(long, default_value_t = 0)]
    pub offset: i64,

    /// Page size; -1 returns everything
    #[arg(long, default_value_t = UNBOUNDED, allow_hyphen_values = true)]
    pub limit: i64,

    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort direction
    #[arg(long, value_enum, default_value = "desc")]
    pub order: Order,

    /// Follow the listing until the last page
    #[arg(long)]
    pub all: bool,
}

impl PageArgs {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit,
            sort: self.sort.clone(),
            order: self.order.into(),
        }
    }
}

/// Arguments for the clients command
#[derive(Args, Debug)]
pub struct ClientsArgs {
    /// Only list clients that are online
    #[arg(long)]
    pub online: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

/// Arguments for the sessions command
#[derive(Args, Debug)]
pub struct SessionsArgs {
    /// Only sessions this client took part in
    #[arg(long)]
    pub cid: Option<i64>,

    /// Direction relative to --cid
    #[arg(long, value_enum, default_value = "inout", requires = "cid")]
    pub direction: Direction,

    /// Earliest start time (Unix seconds)
    #[arg(long)]
    pub from: Option<i64>,

    /// Latest start time (Unix seconds)
    #[arg(long)]
    pub to: Option<i64>,

    #[command(flatten)]
    pub page: PageArgs,
}

/// Arguments for the comment command
#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Session ID
    pub sid: String,

    /// New comment text
    #[arg(required_unless_present = "clear", conflicts_with = "clear")]
    pub text: Option<String>,

    /// Remove the comment instead of setting one
    #[arg(long)]
    pub clear: bool,
}

pub fn auth(api: &Transport) -> Result<()> {
    let auth = call(api, &AuthRequest::new()).context("authentication failed")?;
    info!(license = %auth.license_id, result = %auth.result, "authenticated");
    print_json(&auth)
}

pub fn sysinfo(api: &Transport) -> Result<()> {
    let info = call(api, &SysinfoRequest::new())?;
    print_json(&info)
}

pub fn client(api: &Transport, cid: i64) -> Result<()> {
    let client = call(api, &ClientDetailRequest::new(cid)).with_context(|| format!("client {cid}"))?;
    print_json(&client)
}

pub fn clients(api: &Transport, args: ClientsArgs) -> Result<()> {
    let mut request = ClientListRequest::new().with_pagination(args.page.pagination());
    request.online_only = args.online;
    list(api, request, args.page.all)
}

pub fn sessions(api: &Transport, args: SessionsArgs) -> Result<()> {
    let mut request = SessionListRequest::new().with_pagination(args.page.pagination());
    if let Some(cid) = args.cid {
        request = request.client(cid, args.direction.into());
    }
    request.from = args.from;
    request.to = args.to;
    list(api, request, args.page.all)
}

pub fn comment(api: &Transport, args: CommentArgs) -> Result<()> {
    let request = match args.text {
        Some(text) if !args.clear => SessionCommentRequest::set(&args.sid, &text),
        _ => SessionCommentRequest::clear(&args.sid),
    };
    call(api, &request).with_context(|| format!("session {}", args.sid))?;
    info!(sid = %args.sid, cleared = request.comment.is_none(), "comment updated");
    Ok(())
}

/// Run one call, dumping its debug snapshot when capture is on.
fn call<E: Endpoint>(api: &Transport, endpoint: &E) -> Result<E::Response> {
    let exchange = api.exchange(endpoint);
    if let Some(snapshot) = exchange.envelope.debug() {
        dump(snapshot);
    }
    Ok(exchange.result?)
}

fn list<E>(api: &Transport, request: E, all: bool) -> Result<()>
where
    E: ListEndpoint,
    E::Response: Serialize,
{
    if !all {
        let page = call(api, &request)?;
        return print_json(&page);
    }
    for page in api.pages(request) {
        print_json(&page?)?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn dump(snapshot: &DebugSnapshot) {
    if let Some(url) = &snapshot.request_url {
        eprintln!("> {url}");
    }
    if !snapshot.request_body.is_empty() {
        eprintln!("> {}", String::from_utf8_lossy(&snapshot.request_body));
    }
    if let Some(status) = snapshot.response_status {
        eprintln!("< {status}");
        for (name, value) in &snapshot.response_headers {
            eprintln!("< {name}: {value}");
        }
        eprintln!("< {}", snapshot.response_text());
    }
}
