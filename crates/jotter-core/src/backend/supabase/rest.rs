//! PostgREST access to the `notes` table.

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};

use super::read_success;
use crate::config::ClientConfig;
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::Result;

const NOTES_TABLE: &str = "notes";
/// Makes PostgREST answer with one object and fail unless exactly one row matches.
const SINGLE_OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";

#[derive(Clone)]
pub(super) struct PostgrestClient {
    table_url: String,
    anon_key: String,
    client: Client,
}

impl PostgrestClient {
    pub(super) fn new(config: &ClientConfig, client: Client) -> Self {
        Self {
            table_url: format!("{}/{NOTES_TABLE}", config.rest_url()),
            anon_key: config.supabase_anon_key.clone(),
            client,
        }
    }

    pub(super) async fn select_by_id(&self, access_token: &str, id: &NoteId) -> Result<Note> {
        let request = self
            .authorized(self.client.get(&self.table_url), access_token)
            .header(ACCEPT, SINGLE_OBJECT_MEDIA_TYPE)
            .query(&[("select", "*".to_string()), ("id", eq_filter(id.as_str()))]);
        let response = read_success(request.send().await?).await?;
        Ok(response.json::<Note>().await?)
    }

    pub(super) async fn select_owned(&self, access_token: &str, user_id: &str) -> Result<Vec<Note>> {
        let request = self
            .authorized(self.client.get(&self.table_url), access_token)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq_filter(user_id)),
                ("order", "created_at.desc".to_string()),
            ]);
        let response = read_success(request.send().await?).await?;
        Ok(response.json::<Vec<Note>>().await?)
    }

    pub(super) async fn insert(&self, access_token: &str, note: &NewNote) -> Result<()> {
        let request = self
            .authorized(self.client.post(&self.table_url), access_token)
            .header("Prefer", "return=minimal")
            .json(note);
        read_success(request.send().await?).await?;
        Ok(())
    }

    pub(super) async fn update(
        &self,
        access_token: &str,
        id: &NoteId,
        patch: &NotePatch,
    ) -> Result<()> {
        let request = self
            .authorized(self.client.patch(&self.table_url), access_token)
            .header("Prefer", "return=minimal")
            .query(&[("id", eq_filter(id.as_str()))])
            .json(patch);
        read_success(request.send().await?).await?;
        Ok(())
    }

    pub(super) async fn delete(&self, access_token: &str, id: &NoteId) -> Result<()> {
        let request = self
            .authorized(self.client.delete(&self.table_url), access_token)
            .query(&[("id", eq_filter(id.as_str()))]);
        read_success(request.send().await?).await?;
        Ok(())
    }

    fn authorized(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }
}

fn eq_filter(value: &str) -> String {
    format!("eq.{value}")
}
