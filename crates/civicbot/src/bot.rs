//! The question-answering bot shared by every host (CLI, chat integrations).

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use civicbot_core::{decode_reply, ChartSelectResponse, SqlResponse};
use civicbot_data::TableReader;
use civicbot_graph::{ContentStore, Module};
use civicbot_llm::{ChartSelectPrompt, ChatModel, SqlGenPrompt};
use civicbot_transcript::TranscriptSession;

use crate::chart;
use crate::error::{BotError, Result};
use crate::transcript;

const MODULE_CATEGORY: &str = "Open Data";
const MODULE_DESCRIPTION: &str = "User-generated open data visualization";
const MODULE_CODE_CREDIT: &str = "CivicBot, an open data bot";
const AD_UNITS_INIT: &str = "\n\nmodule.initAdUnits();";

/// Everything needed to publish an answer as a module page.
#[derive(Debug, Clone, Default)]
pub struct ModuleDraft {
    /// Module UUID.
    pub id: String,
    pub title: String,
    /// Rendered HTML body.
    pub body: String,
    /// Chart JS; the ad-unit initializer is appended on publish.
    pub js: String,
    pub feature_image: String,
    /// Credited creator.
    pub user: String,
}

/// Publishing choices for [`CivicBot::answer`].
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub user: String,
    pub feature_image: String,
}

/// The result of answering one question end to end.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    pub sql: SqlResponse,
    pub table: String,
    pub chart: ChartSelectResponse,
    /// Site-relative path of the published module, when published.
    pub module_path: Option<String>,
}

/// Turns questions into SQL, tables, charts, and published modules.
pub struct CivicBot {
    hostname: String,
    ai: Arc<dyn ChatModel>,
    reader: TableReader,
    graph_store: Option<Arc<dyn ContentStore>>,
}

impl CivicBot {
    pub fn new(
        ai: Arc<dyn ChatModel>,
        reader: TableReader,
        graph_store: Option<Arc<dyn ContentStore>>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            ai,
            reader,
            graph_store,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn model_name(&self) -> &str {
        self.ai.model_name()
    }

    /// Ask the model to write SQL answering `question`.
    pub async fn sql_analysis(&self, question: &str) -> Result<SqlResponse> {
        let prompt = SqlGenPrompt::new(Local::now().date_naive(), question).render_prompt()?;
        let reply = self.ai.complete(&prompt).await?;
        let resp: SqlResponse = decode_reply(&reply)?;

        tracing::info!(
            applicability = %resp.applicability,
            has_query = resp.has_query(),
            "SQL analysis complete"
        );
        Ok(resp)
    }

    /// Run `sql` against the open-data database and render the result table.
    pub async fn load_results(&self, sql: &str) -> Result<String> {
        Ok(self.reader.read_data_table(sql).await?)
    }

    /// Ask the model to pick a chart for `data_table`.
    pub async fn select_chart(&self, question: &str, data_table: &str) -> Result<ChartSelectResponse> {
        let prompt = ChartSelectPrompt::new(question, data_table).render_prompt()?;
        let reply = self.ai.complete(&prompt).await?;
        let resp: ChartSelectResponse = decode_reply(&reply)?;

        tracing::info!(
            chart = %resp.chart,
            title = %resp.title,
            entries = resp.data.len(),
            value_is_currency = resp.value_is_currency,
            "Chart selected"
        );
        Ok(resp)
    }

    pub fn has_graph_store(&self) -> bool {
        self.graph_store.is_some()
    }

    /// Publish a module and return its site-relative path, `/mod/{slug_id}/{slug_title}`.
    pub async fn save_to_graph(&self, draft: &ModuleDraft) -> Result<String> {
        let store = self.graph_store.as_ref().ok_or(BotError::NoGraphStore)?;
        let module = build_module(draft, Local::now().date_naive());

        store
            .write_module(&module)
            .await
            .map_err(BotError::graph("writing module"))?;

        let vertex = module
            .vertex_query()
            .map_err(BotError::graph("generating vertex query"))?;
        store
            .write_body_text(&vertex, &draft.body)
            .await
            .map_err(BotError::graph("writing body text"))?;

        let js = format!("{}{AD_UNITS_INIT}", draft.js);
        store
            .write_js(&vertex, &js)
            .await
            .map_err(BotError::graph("writing JS"))?;

        let slug_id = module
            .slug_id()
            .map_err(BotError::graph("generating slug ID"))?;
        Ok(format!("/mod/{}/{}", slug_id, module.slug_title()))
    }

    /// Absolute URL for a path returned by [`CivicBot::save_to_graph`].
    pub fn module_url(&self, path: &str) -> String {
        format!("https://{}{}", self.hostname, path)
    }

    /// Run every step for `question`, recording each into `session`.
    ///
    /// Publishes only when `publish` is given. Stops at the first failure.
    pub async fn answer(
        &self,
        question: &str,
        publish: Option<&PublishOptions>,
        session: &mut TranscriptSession,
    ) -> Result<Answer> {
        let sql = recorded(session, "sql_analysis", self.sql_analysis(question).await)?;
        transcript::record_sql_analysis(session, &sql);
        if !sql.has_query() {
            return Err(BotError::NoQuery {
                applicability: sql.applicability,
                missing_data: sql.missing_data,
            });
        }

        let table = recorded(session, "load_results", self.load_results(&sql.sql).await)?;
        transcript::record_results(session, &table);

        let chart = recorded(
            session,
            "select_chart",
            self.select_chart(question, &table).await,
        )?;
        transcript::record_chart(session, &chart);

        let module_path = match publish {
            Some(options) => {
                let id = Uuid::new_v4().to_string();
                let path = recorded(
                    session,
                    "publish",
                    self.publish(&id, question, &sql, &table, &chart, options).await,
                )?;
                transcript::record_publish(session, &id, &path);
                Some(path)
            }
            None => None,
        };

        Ok(Answer {
            question: question.to_string(),
            sql,
            table,
            chart,
            module_path,
        })
    }

    async fn publish(
        &self,
        id: &str,
        question: &str,
        sql: &SqlResponse,
        table: &str,
        chart: &ChartSelectResponse,
        options: &PublishOptions,
    ) -> Result<String> {
        let title = if chart.title.trim().is_empty() {
            question
        } else {
            chart.title.as_str()
        };
        let draft = ModuleDraft {
            id: id.to_string(),
            title: title.to_string(),
            body: chart::render_body(question, &sql.sql, table)?,
            js: chart::render_js(chart),
            feature_image: options.feature_image.clone(),
            user: options.user.clone(),
        };
        self.save_to_graph(&draft).await
    }
}

fn recorded<T>(session: &mut TranscriptSession, kind: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        transcript::record_failure(session, kind, e);
    }
    result
}

/// Module metadata for a draft published on `today`.
fn build_module(draft: &ModuleDraft, today: NaiveDate) -> Module {
    Module {
        id: draft.id.clone(),
        name: draft.title.clone(),
        headline: format!("<h1>City Budget: {}</h1>", draft.title),
        categories: vec![MODULE_CATEGORY.to_string()],
        creators: vec![draft.user.clone()],
        camera: default_camera(),
        feature_image: draft.feature_image.clone(),
        description: MODULE_DESCRIPTION.to_string(),
        pub_date: today.format("%Y-%m-%d").to_string(),
        code_credit: MODULE_CODE_CREDIT.to_string(),
    }
}

/// Downtown view, tilted.
fn default_camera() -> serde_json::Value {
    serde_json::json!({
        "": {
            "center": { "lng": -79.384, "lat": 43.645 },
            "zoom": 13.8,
            "pitch": 0,
            "bearing": -30,
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use civicbot_graph::{GraphError, VertexQuery};
    use civicbot_llm::LlmError;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    /// Replies in order and remembers every prompt.
    struct ScriptedModel {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> civicbot_llm::error::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyReply)
        }
    }

    /// Records writes; optionally fails one kind of write.
    #[derive(Default)]
    struct RecordingStore {
        modules: Mutex<Vec<Module>>,
        texts: Mutex<Vec<(&'static str, String)>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingStore {
        fn check(&self, kind: &'static str, vertex: &VertexQuery) -> std::result::Result<(), GraphError> {
            if self.fail_on == Some(kind) {
                return Err(GraphError::NotFound {
                    label: vertex.label.to_string(),
                    id: vertex.id.to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ContentStore for RecordingStore {
        async fn write_module(&self, module: &Module) -> std::result::Result<(), GraphError> {
            module.vertex_query()?;
            self.modules.lock().unwrap().push(module.clone());
            Ok(())
        }

        async fn write_body_text(
            &self,
            vertex: &VertexQuery,
            body: &str,
        ) -> std::result::Result<(), GraphError> {
            self.check("body", vertex)?;
            self.texts.lock().unwrap().push(("body", body.to_string()));
            Ok(())
        }

        async fn write_js(&self, vertex: &VertexQuery, js: &str) -> std::result::Result<(), GraphError> {
            self.check("js", vertex)?;
            self.texts.lock().unwrap().push(("js", js.to_string()));
            Ok(())
        }
    }

    const SQL_REPLY: &str = r#"{
        "Schema": "operating_budget(program, amount)",
        "Applicability": "Answerable from the operating budget",
        "SQL": "SELECT program, SUM(amount) AS total FROM operating_budget GROUP BY program ORDER BY total DESC",
        "MissingData": ""
    }"#;

    const CHART_REPLY: &str = r#"{
        "Chart": "bar",
        "Title": "Operating Budget by Program",
        "Data": [{"Name": "Police Service", "Value": 1100.25}, {"Name": "Fire Services", "Value": 450.5}],
        "ValueIsCurrency": true
    }"#;

    async fn test_reader() -> TableReader {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE operating_budget (program TEXT, amount REAL)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO operating_budget VALUES
                ('Police Service', 900.25), ('Police Service', 200.0), ('Fire Services', 450.5)",
        )
        .execute(&pool)
        .await
        .unwrap();
        TableReader::from_pool(pool)
    }

    async fn test_bot(
        model: Arc<ScriptedModel>,
        store: Option<Arc<RecordingStore>>,
    ) -> CivicBot {
        let store = store.map(|s| s as Arc<dyn ContentStore>);
        CivicBot::new(model, test_reader().await, store, "bot.example.org")
    }

    fn draft() -> ModuleDraft {
        ModuleDraft {
            id: Uuid::from_u128(3845).to_string(),
            title: "Police vs. Fire".to_string(),
            body: "<p>body</p>".to_string(),
            js: "draw();".to_string(),
            feature_image: "https://img.example.org/chart.png".to_string(),
            user: "jane".to_string(),
        }
    }

    #[tokio::test]
    async fn sql_analysis_decodes_reply() {
        let model = ScriptedModel::new(&[SQL_REPLY]);
        let bot = test_bot(model.clone(), None).await;

        let resp = bot.sql_analysis("What does each program cost?").await.unwrap();
        assert!(resp.sql.starts_with("SELECT program"));
        assert_eq!(resp.applicability, "Answerable from the operating budget");

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Question: What does each program cost?"));
    }

    #[tokio::test]
    async fn sql_analysis_rejects_non_json() {
        let model = ScriptedModel::new(&["I cannot answer that."]);
        let bot = test_bot(model, None).await;

        let err = bot.sql_analysis("What?").await.unwrap_err();
        assert!(matches!(err, BotError::Decode(_)));
        assert!(err.to_string().contains("I cannot answer that."));
    }

    #[tokio::test]
    async fn chat_failure_propagates() {
        let model = ScriptedModel::new(&[]);
        let bot = test_bot(model, None).await;
        let err = bot.sql_analysis("What?").await.unwrap_err();
        assert!(matches!(err, BotError::Llm(LlmError::EmptyReply)));
    }

    #[tokio::test]
    async fn select_chart_sends_table() {
        let model = ScriptedModel::new(&[CHART_REPLY]);
        let bot = test_bot(model.clone(), None).await;

        let chart = bot
            .select_chart("What does each program cost?", "| program | total |")
            .await
            .unwrap();
        assert_eq!(chart.title, "Operating Budget by Program");
        assert_eq!(chart.data.len(), 2);
        assert!(model.prompts()[0].contains("| program | total |"));
    }

    #[tokio::test]
    async fn load_results_renders_table() {
        let bot = test_bot(ScriptedModel::new(&[]), None).await;
        let table = bot
            .load_results("SELECT program, SUM(amount) AS total FROM operating_budget GROUP BY program ORDER BY total DESC")
            .await
            .unwrap();
        assert!(table.contains("| Police Service | 1100.25 |"));
    }

    #[tokio::test]
    async fn save_to_graph_requires_store() {
        let bot = test_bot(ScriptedModel::new(&[]), None).await;
        assert!(!bot.has_graph_store());
        let err = bot.save_to_graph(&draft()).await.unwrap_err();
        assert!(matches!(err, BotError::NoGraphStore));
    }

    #[tokio::test]
    async fn save_to_graph_writes_module_body_and_js() {
        let store = Arc::new(RecordingStore::default());
        let bot = test_bot(ScriptedModel::new(&[]), Some(store.clone())).await;
        assert!(bot.has_graph_store());

        let path = bot.save_to_graph(&draft()).await.unwrap();
        assert_eq!(path, "/mod/101/police-vs-fire");
        assert_eq!(
            bot.module_url(&path),
            "https://bot.example.org/mod/101/police-vs-fire"
        );

        let modules = store.modules.lock().unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].headline, "<h1>City Budget: Police vs. Fire</h1>");
        assert_eq!(modules[0].creators, vec!["jane".to_string()]);

        let texts = store.texts.lock().unwrap();
        assert_eq!(texts[0], ("body", "<p>body</p>".to_string()));
        assert_eq!(texts[1], ("js", "draw();\n\nmodule.initAdUnits();".to_string()));
    }

    #[tokio::test]
    async fn save_to_graph_wraps_step_errors() {
        let store = Arc::new(RecordingStore {
            fail_on: Some("js"),
            ..Default::default()
        });
        let bot = test_bot(ScriptedModel::new(&[]), Some(store)).await;

        let err = bot.save_to_graph(&draft()).await.unwrap_err();
        assert!(err.to_string().starts_with("writing JS: "));
    }

    #[tokio::test]
    async fn save_to_graph_rejects_bad_id() {
        let store = Arc::new(RecordingStore::default());
        let bot = test_bot(ScriptedModel::new(&[]), Some(store)).await;
        let mut bad = draft();
        bad.id = "not-a-uuid".to_string();

        let err = bot.save_to_graph(&bad).await.unwrap_err();
        assert!(err.to_string().starts_with("writing module: "));
    }

    #[test]
    fn build_module_fills_metadata() {
        let today = NaiveDate::from_ymd_opt(2023, 3, 7).unwrap();
        let module = build_module(&draft(), today);
        assert_eq!(module.pub_date, "2023-03-07");
        assert_eq!(module.categories, vec!["Open Data".to_string()]);
        assert_eq!(module.description, "User-generated open data visualization");
        assert_eq!(module.code_credit, "CivicBot, an open data bot");
        assert_eq!(module.camera[""]["zoom"], 13.8);
        assert_eq!(module.camera[""]["bearing"], -30);
        assert_eq!(module.feature_image, "https://img.example.org/chart.png");
    }

    #[tokio::test]
    async fn answer_runs_every_step_and_publishes() {
        let model = ScriptedModel::new(&[SQL_REPLY, CHART_REPLY]);
        let store = Arc::new(RecordingStore::default());
        let bot = test_bot(model.clone(), Some(store.clone())).await;
        let mut session = transcript::start_session("What does each program cost?", bot.model_name(), Some("jane"));

        let options = PublishOptions {
            user: "jane".to_string(),
            feature_image: String::new(),
        };
        let answer = bot
            .answer("What does each program cost?", Some(&options), &mut session)
            .await
            .unwrap();

        assert!(answer.table.contains("| Fire Services  |   450.5 |"));
        assert_eq!(answer.chart.data.len(), 2);
        let path = answer.module_path.unwrap();
        assert!(path.ends_with("/operating-budget-by-program"));

        // The chart prompt carries the rendered table.
        assert!(model.prompts()[1].contains("| Police Service | 1100.25 |"));

        let texts = store.texts.lock().unwrap();
        assert!(texts[0].1.contains("What does each program cost?"));
        assert!(texts[1].1.contains("\"type\":\"bar\""));

        let transcript = session.finalize();
        let kinds: Vec<&str> = transcript.steps.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, ["sql_analysis", "load_results", "select_chart", "publish"]);
        assert!(transcript.succeeded());
    }

    #[tokio::test]
    async fn answer_without_sql_stops_early() {
        let model = ScriptedModel::new(&[
            r#"{"Applicability": "Not answerable", "SQL": "", "MissingData": "ward boundaries"}"#,
        ]);
        let bot = test_bot(model.clone(), None).await;
        let mut session = transcript::start_session("Which ward is biggest?", "scripted", None);

        let err = bot
            .answer("Which ward is biggest?", None, &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::NoQuery { ref missing_data, .. } if missing_data == "ward boundaries"));
        assert_eq!(model.prompts().len(), 1);

        let transcript = session.finalize();
        assert_eq!(transcript.steps.len(), 1);
        assert!(!transcript.succeeded());
    }

    #[tokio::test]
    async fn answer_records_query_failure() {
        let model = ScriptedModel::new(&[r#"{"SQL": "SELECT * FROM capital_budget"}"#]);
        let bot = test_bot(model, None).await;
        let mut session = transcript::start_session("q", "scripted", None);

        let err = bot.answer("q", None, &mut session).await.unwrap_err();
        assert!(matches!(err, BotError::Data(_)));

        let transcript = session.finalize();
        assert_eq!(transcript.steps.last().unwrap().kind, "load_results");
        assert!(!transcript.steps.last().unwrap().success);
    }
}
