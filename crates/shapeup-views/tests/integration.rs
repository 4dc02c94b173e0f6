//! Integration tests driving every view through `dispatch` with an in-memory
//! article store: listing and pagination, lookup, the preview/submit flow,
//! create, update, delete, and the query interface.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use shapeup_core::{ShapeupError, ShapeupResult};
use shapeup_http::HttpRequest;
use shapeup_views::form::{FormDefinition, FormField};
use shapeup_views::query::{QueryInterface, QueryLookup};
use shapeup_views::render::TeraRenderer;
use shapeup_views::views::{
    CreateView, DeleteView, DetailView, ListView, Templated, UpdateView, View,
};
use shapeup_views::{
    Entity, FieldValues, LookupParam, MultipleObjects, ObjectDeleter, ObjectLookup, ObjectSaver,
    ObjectSource, ObjectUpdater, SingleObject,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Article {
    pk: String,
    title: String,
    body: String,
}

impl Entity for Article {}

#[derive(Default)]
struct Store {
    articles: Mutex<Vec<Article>>,
    saved: Mutex<Vec<FieldValues>>,
}

impl Store {
    fn seeded(count: usize) -> Arc<Self> {
        let store = Self::default();
        {
            let mut articles = store.articles.lock().unwrap();
            for i in 1..=count {
                articles.push(Article {
                    pk: i.to_string(),
                    title: format!("Article {i}"),
                    body: format!("Body {i}"),
                });
            }
        }
        Arc::new(store)
    }

    fn titles(&self) -> Vec<String> {
        self.articles
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.title.clone())
            .collect()
    }
}

/// The views share one store; each view holds its own handle.
#[derive(Clone)]
struct Articles(Arc<Store>);

impl ObjectSource for Articles {
    type Objects = Vec<Article>;

    fn get_queryset(&self, _request: &HttpRequest) -> ShapeupResult<Option<Vec<Article>>> {
        Ok(Some(self.0.articles.lock().unwrap().clone()))
    }
}

#[async_trait]
impl ObjectLookup for Articles {
    type Object = Article;

    async fn lookup_object(
        &self,
        param: &LookupParam,
        _request: &HttpRequest,
    ) -> ShapeupResult<Option<Article>> {
        let articles = self.0.articles.lock().unwrap();
        Ok(articles.iter().find(|a| a.pk == param.value).cloned())
    }
}

#[async_trait]
impl ObjectSaver for Articles {
    type Object = Article;

    async fn save_object(
        &self,
        fields: FieldValues,
        _request: &HttpRequest,
    ) -> ShapeupResult<Article> {
        self.0.saved.lock().unwrap().push(fields.clone());
        let mut article: Article = fields.merged([("pk", "")].into_iter().collect()).deserialize()?;
        let mut articles = self.0.articles.lock().unwrap();
        article.pk = (articles.len() + 1).to_string();
        articles.push(article.clone());
        Ok(article)
    }
}

#[async_trait]
impl ObjectUpdater for Articles {
    async fn update_object(&self, fields: FieldValues, _request: &HttpRequest) -> ShapeupResult<()> {
        let updated: Article = fields.deserialize()?;
        let mut articles = self.0.articles.lock().unwrap();
        let slot = articles
            .iter_mut()
            .find(|a| a.pk == updated.pk)
            .ok_or_else(|| ShapeupError::Persistence(format!("no article {}", updated.pk)))?;
        *slot = updated;
        Ok(())
    }
}

#[async_trait]
impl ObjectDeleter for Articles {
    async fn delete_object(&self, param: &LookupParam, _request: &HttpRequest) -> ShapeupResult<()> {
        self.0.articles.lock().unwrap().retain(|a| a.pk != param.value);
        Ok(())
    }
}

fn article_form() -> FormDefinition {
    FormDefinition::new()
        .field(FormField::char("title").max_length(40))
        .field(FormField::char("body"))
}

fn get(path: &str) -> HttpRequest {
    HttpRequest::builder().path(path).build()
}

fn post(path: &str, body: &str) -> HttpRequest {
    HttpRequest::builder()
        .method(Method::POST)
        .path(path)
        .form(body)
        .build()
}

// ═════════════════════════════════════════════════════════════════════
// 1. Listing and pagination
// ═════════════════════════════════════════════════════════════════════

fn list_view(store: &Arc<Store>) -> ListView<Articles> {
    ListView::new(Articles(Arc::clone(store)))
        .with_name("ArticleList")
        .with_template("articles/list.html")
        .with_listing(MultipleObjects::new().paginate_by(10))
}

#[tokio::test]
async fn test_last_page_of_twenty_five() {
    let view = list_view(&Store::seeded(25));
    let request = HttpRequest::builder().query_string("page=last").build();
    let response = view.dispatch(&request).await.unwrap();

    let context = response.context().unwrap();
    assert_eq!(context["page_obj"]["number"], 3);
    assert_eq!(context["object_list"].as_array().unwrap().len(), 5);
    assert_eq!(context["object_list"][0]["title"], "Article 21");
    assert_eq!(context["is_paginated"], true);
    assert_eq!(context["paginator"]["num_pages"], 3);
}

#[tokio::test]
async fn test_every_integer_page_resolves() {
    let view = list_view(&Store::seeded(25));
    for (page, expected) in [(1, 10), (2, 10), (3, 5)] {
        let request = HttpRequest::builder().kwarg("page", &page.to_string()).build();
        let response = view.dispatch(&request).await.unwrap();
        let context = response.context().unwrap();
        assert_eq!(context["page_obj"]["number"], page);
        assert_eq!(context["object_list"].as_array().unwrap().len(), expected);
    }
}

#[tokio::test]
async fn test_out_of_range_and_garbage_pages_are_not_found() {
    let view = list_view(&Store::seeded(25));
    for token in ["0", "4", "-1", "second"] {
        let request = HttpRequest::builder().kwarg("page", token).build();
        let err = view.dispatch(&request).await.unwrap_err();
        assert!(matches!(err, ShapeupError::NotFound(_)), "token {token}");
    }

    let request = HttpRequest::builder().kwarg("page", "4").build();
    let err = view.dispatch(&request).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Not found: Invalid page (4): That page contains no results"
    );
}

#[tokio::test]
async fn test_last_on_empty_collection() {
    let view = list_view(&Store::seeded(0));
    let request = HttpRequest::builder().query_string("page=last").build();
    let response = view.dispatch(&request).await.unwrap();
    let context = response.context().unwrap();
    assert_eq!(context["page_obj"]["number"], 1);
    assert_eq!(context["object_list"], json!([]));
    assert_eq!(context["is_paginated"], false);
}

#[tokio::test]
async fn test_allow_empty() {
    let store = Store::seeded(0);

    let allowed = list_view(&store).with_listing(MultipleObjects::new().allow_empty(true));
    let response = allowed.dispatch(&get("/articles/")).await.unwrap();
    assert_eq!(response.context().unwrap()["object_list"], json!([]));

    let rejected = list_view(&store).with_listing(MultipleObjects::new().allow_empty(false));
    let err = rejected.dispatch(&get("/articles/")).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_unconfigured_source() {
    struct Nothing;

    impl ObjectSource for Nothing {
        type Objects = Vec<Article>;
    }

    let view = ListView::new(Nothing)
        .with_name("Orphan")
        .with_template("orphan.html");
    let err = view.dispatch(&get("/")).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Improperly configured: 'Orphan' must either override 'list_objects()' or 'get_queryset()', or define 'queryset'"
    );
}

// ═════════════════════════════════════════════════════════════════════
// 2. Single-object lookup
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_detail_and_custom_kwarg() {
    let store = Store::seeded(3);
    let view = DetailView::new(Articles(Arc::clone(&store)))
        .with_name("ArticleDetail")
        .with_template("articles/detail.html")
        .with_lookup(SingleObject::new().lookup_url_kwarg("article_id"));

    let request = HttpRequest::builder().kwarg("article_id", "2").build();
    let response = view.dispatch(&request).await.unwrap();
    assert_eq!(response.context().unwrap()["object"]["title"], "Article 2");

    let missing = HttpRequest::builder().kwarg("pk", "2").build();
    let err = view.dispatch(&missing).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Improperly configured: Lookup field 'article_id' was not provided in view kwargs to 'ArticleDetail'"
    );

    let unknown = HttpRequest::builder().kwarg("article_id", "99").build();
    let err = view.dispatch(&unknown).await.unwrap_err();
    assert!(matches!(err, ShapeupError::NotFound(_)));
}

#[tokio::test]
async fn test_detail_through_query_interface() {
    let store = Store::seeded(3);
    let rows = Arc::clone(&store);
    let interface = QueryInterface::new().handler("article", "by_pk", move |fields: &FieldValues| {
        let articles = rows.articles.lock().unwrap();
        Ok(articles
            .iter()
            .find(|a| fields.get_str("pk") == Some(a.pk.as_str()))
            .cloned())
    });

    let view = DetailView::new(QueryLookup::new(Arc::new(interface), "article", "by_pk"))
        .with_template("articles/detail.html");
    let request = HttpRequest::builder().kwarg("pk", "3").build();
    let response = view.dispatch(&request).await.unwrap();
    assert_eq!(response.context().unwrap()["object"]["body"], "Body 3");
}

// ═════════════════════════════════════════════════════════════════════
// 3. Create
// ═════════════════════════════════════════════════════════════════════

fn create_view(store: &Arc<Store>) -> CreateView<FormDefinition, Articles> {
    CreateView::new(article_form(), Articles(Arc::clone(store)))
        .with_name("ArticleCreate")
        .with_template("articles/form.html")
        .with_flow(|flow| {
            flow.preview_template("articles/preview.html")
                .success_url("/articles/")
        })
}

#[tokio::test]
async fn test_create_saves_cleaned_data_and_redirects() {
    let store = Store::seeded(0);
    let view = create_view(&store);

    let response = view
        .dispatch(&post("/articles/new/", "title=Hello&body=World"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.location(), Some("/articles/"));

    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].clone().into_value(), json!({"title": "Hello", "body": "World"}));
    assert_eq!(store.titles(), vec!["Hello"]);
}

#[tokio::test]
async fn test_create_preview_persists_nothing() {
    let store = Store::seeded(0);
    let view = create_view(&store);

    let response = view
        .dispatch(&post("/articles/new/", "title=Hello&body=World&preview="))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.template_name(), Some("articles/preview.html"));
    assert_eq!(
        response.context().unwrap()["form"]["cleaned_data"]["title"],
        "Hello"
    );
    assert!(store.saved.lock().unwrap().is_empty());
    assert!(store.titles().is_empty());
}

#[tokio::test]
async fn test_create_invalid_rerenders_with_errors() {
    let store = Store::seeded(0);
    let view = create_view(&store);

    let long_title = "x".repeat(41);
    let response = view
        .dispatch(&post("/articles/new/", &format!("title={long_title}&body=")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.template_name(), Some("articles/form.html"));
    let errors = &response.context().unwrap()["form"]["errors"];
    assert_eq!(
        errors["title"][0],
        "Ensure this value has at most 40 characters (it has 41)."
    );
    assert_eq!(errors["body"][0], "This field is required.");
    assert!(store.saved.lock().unwrap().is_empty());
}

// ═════════════════════════════════════════════════════════════════════
// 4. Update
// ═════════════════════════════════════════════════════════════════════

fn update_view(store: &Arc<Store>) -> UpdateView<FormDefinition, Articles> {
    UpdateView::new(article_form(), Articles(Arc::clone(store)))
        .with_name("ArticleUpdate")
        .with_template("articles/form.html")
        .with_flow(|flow| {
            flow.preview_template("articles/preview.html")
                .success_url("/articles/")
        })
}

#[tokio::test]
async fn test_update_get_initial_equals_object_fields() {
    let store = Store::seeded(2);
    let view = update_view(&store);

    let request = HttpRequest::builder().kwarg("pk", "2").build();
    let response = view.dispatch(&request).await.unwrap();
    let context = response.context().unwrap();
    assert_eq!(
        context["form"]["initial"],
        json!({"pk": "2", "title": "Article 2", "body": "Body 2"})
    );
    assert_eq!(context["form"]["fields"][0]["value"], "Article 2");
    assert_eq!(context["object"]["pk"], "2");
}

#[tokio::test]
async fn test_update_merges_lookup_and_redirects() {
    let store = Store::seeded(2);
    let view = update_view(&store);

    let request = HttpRequest::builder()
        .method(Method::POST)
        .kwarg("pk", "1")
        .form("title=Renamed&body=New+body")
        .build();
    let response = view.dispatch(&request).await.unwrap();
    assert_eq!(response.location(), Some("/articles/"));
    assert_eq!(store.titles(), vec!["Renamed", "Article 2"]);
}

#[tokio::test]
async fn test_update_preview_changes_nothing() {
    let store = Store::seeded(1);
    let view = update_view(&store);

    let request = HttpRequest::builder()
        .method(Method::POST)
        .kwarg("pk", "1")
        .form("title=Renamed&body=x&preview=1")
        .build();
    let response = view.dispatch(&request).await.unwrap();
    assert_eq!(response.template_name(), Some("articles/preview.html"));
    assert_eq!(response.context().unwrap()["object"]["title"], "Article 1");
    assert_eq!(store.titles(), vec!["Article 1"]);
}

// ═════════════════════════════════════════════════════════════════════
// 5. Delete
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_delete_only_on_post() {
    let store = Store::seeded(2);
    let view = DeleteView::new(Articles(Arc::clone(&store)))
        .with_name("ArticleDelete")
        .with_template("articles/confirm_delete.html")
        .with_success_url("/articles/");

    let confirm = HttpRequest::builder().kwarg("pk", "1").build();
    let response = view.dispatch(&confirm).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.titles().len(), 2);

    let delete = HttpRequest::builder()
        .method(Method::POST)
        .kwarg("pk", "1")
        .build();
    let response = view.dispatch(&delete).await.unwrap();
    assert_eq!(response.location(), Some("/articles/"));
    assert_eq!(store.titles(), vec!["Article 2"]);
}

// ═════════════════════════════════════════════════════════════════════
// 6. Rendering through Tera and the as_view boundary
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_tera_rendered_listing() {
    let renderer = TeraRenderer::from_templates([(
        "articles/list.txt",
        "{% for a in object_list %}{{ a.title }};{% endfor %} page {{ page_obj.number }}/{{ paginator.num_pages }}",
    )])
    .unwrap();
    let view = list_view(&Store::seeded(12))
        .with_template("articles/list.txt")
        .with_renderer(Arc::new(renderer));

    let request = HttpRequest::builder().query_string("page=2").build();
    let response = view.dispatch(&request).await.unwrap();
    assert_eq!(response.text(), "Article 11;Article 12; page 2/2");
}

#[tokio::test]
async fn test_as_view_maps_errors_to_status() {
    let view = list_view(&Store::seeded(3)).as_view();

    let response = view(HttpRequest::builder().query_string("page=9").build()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = view(HttpRequest::builder().method(Method::POST).build()).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
