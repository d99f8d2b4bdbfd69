use chrono_tz::Tz;

use crate::dates::CardDate;
use crate::filters::{Control, Filters};
use crate::locale::Locale;
use crate::models::EventRecord;
use crate::utils::with_cache_bust;

pub const LIST_ID: &str = "event-list";
pub const EMPTY_ID: &str = "empty-state";
pub const YEAR_ID: &str = "year";

/// Swaps a broken poster for the fallback carried in `data-fallback`.
const FALLBACK_SWAP: &str = "this.onerror=null;this.src=this.dataset.fallback;";
const VOID_TAGS: [&str; 4] = ["img", "input", "meta", "br"];

/// A markup tree. Text nodes are always escaped on output, so record fields
/// can never turn into markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            html_escape::encode_double_quoted_attribute_to_string(value, out);
            out.push('"');
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag) {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_html(out),
            Node::Text(text) => {
                html_escape::encode_text_to_string(text, out);
            }
        }
    }
}

/// What the list area currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Cards(Vec<Node>),
    Empty,
    LoadFailed,
}

#[derive(Debug, Clone)]
pub struct RenderContext {
    pub zone: Tz,
    pub locale: Locale,
    pub fallback_image: String,
    /// Cache-busting stamp appended to every image URL.
    pub stamp: u64,
}

/// Builds one card per record, in order.
pub fn render(list: &[&EventRecord], ctx: &RenderContext) -> ListView {
    if list.is_empty() {
        return ListView::Empty;
    }
    ListView::Cards(list.iter().map(|record| card(record, ctx)).collect())
}

fn card(record: &EventRecord, ctx: &RenderContext) -> Node {
    let date = CardDate::from_input(record.date.as_deref(), ctx.zone, ctx.locale);

    let date_block = Element::new("div")
        .class("date")
        .child(Element::new("div").class("m").text(date.month))
        .child(Element::new("div").class("d").text(date.day));

    let mut meta = Element::new("div").class("meta");
    if let Some(time) = &record.time {
        meta = meta.child(span(time)).child(span("•"));
    }
    meta = meta.child(span(record.venue_or_default()));
    if let Some(city) = &record.city {
        meta = meta.child(span("•")).child(span(city));
    }

    let mut content = Element::new("div")
        .class("content")
        .child(Element::new("h3").class("title").text(record.title_or_default()))
        .child(meta);
    if let Some(artists) = &record.artists {
        content = content.child(Element::new("div").class("meta").text(artists.as_str()));
    }
    content = content.child(tags(record, ctx.locale));

    let mut actions = Element::new("div").class("actions");
    if let Some(raw) = record.link.as_deref().filter(|s| !s.trim().is_empty()) {
        match safe_url(raw) {
            Some(href) => {
                actions = actions.child(
                    Element::new("a")
                        .class("btn primary")
                        .attr("href", href)
                        .attr("target", "_blank")
                        .attr("rel", "noopener")
                        .text(ctx.locale.ticket_label()),
                );
            }
            None => tracing::warn!(link = raw, "dropping link with unsupported scheme"),
        }
    }
    content = content.child(actions);

    Element::new("article")
        .class("card")
        .attr("role", "listitem")
        .child(Element::new("div").class("card-img").child(poster(record, ctx)))
        .child(
            Element::new("div")
                .class("card-body")
                .child(date_block)
                .child(content),
        )
        .into()
}

fn tags(record: &EventRecord, locale: Locale) -> Element {
    let mut tags = Element::new("div").class("tags");
    if let Some(price) = &record.price {
        tags = tags.child(tag("tag", price));
    }
    if let Some(status) = record.status {
        tags = tags.child(tag(
            &format!("tag {}", status.class()),
            locale.status_label(status),
        ));
    }
    if let Some(kind) = &record.kind {
        tags = tags.child(tag("tag", kind));
    }
    tags
}

fn poster(record: &EventRecord, ctx: &RenderContext) -> Element {
    let fallback = with_cache_bust(&ctx.fallback_image, ctx.stamp);
    let src = match record.image.as_deref().and_then(safe_url) {
        Some(image) => with_cache_bust(image, ctx.stamp),
        None => {
            if let Some(raw) = record.image.as_deref() {
                tracing::debug!(image = raw, "using fallback poster");
            }
            fallback.clone()
        }
    };

    Element::new("img")
        .attr("loading", "lazy")
        .attr("alt", ctx.locale.poster_alt(record.title_or_default()))
        .attr("src", src)
        .attr("data-fallback", fallback)
        .attr("onerror", FALLBACK_SWAP)
}

fn span(text: &str) -> Node {
    Element::new("span").text(text).into()
}

fn tag(class: &str, text: &str) -> Node {
    Element::new("span").class(class).text(text).into()
}

/// Accepts relative URLs and absolute `http`/`https` ones.
pub fn safe_url(raw: &str) -> Option<&str> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }
    let head = &url[..url.find(['/', '?', '#']).unwrap_or(url.len())];
    match head.find(':') {
        None => Some(url),
        Some(idx) => {
            let scheme = head[..idx].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https").then_some(url)
        }
    }
}

/// The whole document for one state of the board.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub year: i32,
    pub locale: Locale,
    pub filters: &'a Filters,
    pub list: &'a ListView,
}

impl Page<'_> {
    pub fn to_html(&self) -> String {
        let locale = self.locale;

        // Submitting sends each control as `<element id>=<value>`, which
        // `EventBoard::apply_query` reads back.
        let controls = Element::new("form")
            .class("filters")
            .attr("method", "get")
            .children(Control::ALL.iter().map(|control| {
                Node::from(
                    Element::new("input")
                        .attr("id", control.element_id())
                        .attr("name", control.element_id())
                        .attr("type", "search")
                        .attr("placeholder", placeholder(*control, locale))
                        .attr("value", self.filters.value(*control)),
                )
            }))
            .child(
                Element::new("button")
                    .attr("type", "submit")
                    .text(locale.filter_label()),
            );

        let mut list = Element::new("section")
            .attr("id", LIST_ID)
            .class("list")
            .attr("role", "list");
        let mut empty = Element::new("div")
            .attr("id", EMPTY_ID)
            .class("empty")
            .text(locale.empty_message());
        match self.list {
            ListView::Cards(cards) => {
                list = list.children(cards.iter().cloned());
                empty = empty.attr("hidden", "");
            }
            ListView::Empty => {
                list = list.attr("hidden", "");
            }
            ListView::LoadFailed => {
                list = list.child(
                    Element::new("div")
                        .class("empty")
                        .text(locale.load_error_message()),
                );
                empty = empty.attr("hidden", "");
            }
        }

        let head = Element::new("head")
            .child(Element::new("meta").attr("charset", "utf-8"))
            .child(
                Element::new("meta")
                    .attr("name", "viewport")
                    .attr("content", "width=device-width, initial-scale=1"),
            )
            .child(Element::new("title").text(locale.page_title()));

        let body = Element::new("body")
            .child(
                Element::new("header").child(Element::new("h1").text(locale.page_title())),
            )
            .child(controls)
            .child(Element::new("main").child(list).child(empty))
            .child(
                Element::new("footer")
                    .text("© ")
                    .child(Element::new("span").attr("id", YEAR_ID).text(self.year.to_string())),
            );

        let html: Node = Element::new("html")
            .attr("lang", locale.html_lang())
            .child(head)
            .child(body)
            .into();
        format!("<!DOCTYPE html>\n{}\n", html.to_html())
    }
}

fn placeholder(control: Control, locale: Locale) -> &'static str {
    match control {
        Control::Type => locale.type_placeholder(),
        Control::Venue => locale.venue_placeholder(),
        Control::Search => locale.search_placeholder(),
    }
}
