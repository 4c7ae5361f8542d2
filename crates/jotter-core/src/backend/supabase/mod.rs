//! Supabase-hosted backend: GoTrue for auth, PostgREST for the notes table.

mod auth;
mod rest;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{AuthBackend, NotesBackend};
use crate::auth::{
    AuthEvent, AuthEvents, AuthSession, AuthSubscription, AuthUser, SessionPersistence,
    SignUpOutcome,
};
use crate::config::ClientConfig;
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::{Error, Result};

pub use auth::SupabaseAuthClient;
use rest::PostgrestClient;

#[derive(Debug, Default)]
struct SessionCache {
    restored: bool,
    current: Option<AuthSession>,
}

/// Process-wide backend client. Owns the session cache and the auth event fan-out.
pub struct SupabaseBackend<S: SessionPersistence> {
    auth: SupabaseAuthClient<S>,
    rest: PostgrestClient,
    session: Mutex<SessionCache>,
    events: AuthEvents,
}

impl<S: SessionPersistence> SupabaseBackend<S> {
    pub fn new(config: &ClientConfig, store: S) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            auth: SupabaseAuthClient::new(config, client.clone(), store),
            rest: PostgrestClient::new(config, client),
            session: Mutex::new(SessionCache::default()),
            events: AuthEvents::default(),
        })
    }

    async fn access_token(&self) -> Result<String> {
        self.get_session()
            .await?
            .map(|session| session.access_token)
            .ok_or(Error::NotSignedIn)
    }
}

impl<S: SessionPersistence> AuthBackend for SupabaseBackend<S> {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let outcome = self.auth.sign_up(email, password).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            let mut cache = self.session.lock().await;
            cache.restored = true;
            cache.current = Some(session.clone());
            self.events.emit(AuthEvent::SignedIn, Some(session.clone()));
        }
        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = self.auth.sign_in(email, password).await?;
        let mut cache = self.session.lock().await;
        cache.restored = true;
        cache.current = Some(session.clone());
        self.events.emit(AuthEvent::SignedIn, Some(session.clone()));
        tracing::info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let mut cache = self.session.lock().await;
        if !cache.restored {
            cache.current = self.auth.load_stored_session()?;
            cache.restored = true;
        }
        let revoked = match cache.current.take() {
            Some(session) => self.auth.sign_out(&session.access_token).await,
            None => Ok(()),
        };
        // The local session is gone whether or not the server acknowledged it.
        if let Err(error) = &revoked {
            tracing::warn!("Server-side sign-out failed: {}", error);
            self.auth.clear_stored_session()?;
        }
        self.events.emit(AuthEvent::SignedOut, None);
        revoked
    }

    async fn get_session(&self) -> Result<Option<AuthSession>> {
        let mut cache = self.session.lock().await;
        if !cache.restored {
            cache.current = self.auth.load_stored_session()?;
            cache.restored = true;
        }

        let Some(current) = cache.current.clone() else {
            return Ok(None);
        };
        if !current.is_expired() {
            return Ok(Some(current));
        }

        match self.auth.refresh_session(&current.refresh_token).await {
            Ok(refreshed) => {
                cache.current = Some(refreshed.clone());
                self.events
                    .emit(AuthEvent::TokenRefreshed, Some(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(Error::Api(message)) => {
                tracing::warn!("Failed to refresh persisted session: {}", message);
                self.auth.clear_stored_session()?;
                cache.current = None;
                self.events.emit(AuthEvent::SessionExpired, None);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn get_user(&self) -> Result<Option<AuthUser>> {
        let Some(session) = self.get_session().await? else {
            return Ok(None);
        };
        Ok(Some(self.auth.fetch_user(&session.access_token).await?))
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.events.subscribe()
    }
}

impl<S: SessionPersistence> NotesBackend for SupabaseBackend<S> {
    async fn fetch_note(&self, id: &NoteId) -> Result<Note> {
        let token = self.access_token().await?;
        self.rest.select_by_id(&token, id).await
    }

    async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        let token = self.access_token().await?;
        self.rest.select_owned(&token, user_id).await
    }

    async fn insert_note(&self, note: &NewNote) -> Result<()> {
        let token = self.access_token().await?;
        self.rest.insert(&token, note).await
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        let token = self.access_token().await?;
        self.rest.update(&token, id, patch).await
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let token = self.access_token().await?;
        self.rest.delete(&token, id).await
    }
}

/// Pass a successful response through; turn anything else into `Error::Api`.
async fn read_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api(parse_api_error(status, &body)))
}

#[derive(Debug, Deserialize)]
struct SupabaseErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

/// Extract the backend's own error message; the status only appears as a fallback.
fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<SupabaseErrorResponse>(body) {
        if let Some(message) = payload
            .message
            .or(payload.msg)
            .or(payload.error_description)
            .or(payload.error)
        {
            return message.trim().to_string();
        }
    }

    let trimmed = crate::util::compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::auth::MemorySessionStore;

    fn stored_session(expires_at: i64) -> AuthSession {
        AuthSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
            user: AuthUser {
                id: "user-1".to_string(),
                email: None,
            },
        }
    }

    /// Answer one HTTP request with `status` and a JSON `body`; yields the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            let header_end = loop {
                let read = socket.read(&mut buf).await.unwrap();
                assert!(read > 0, "connection closed before request headers");
                request.extend_from_slice(&buf[..read]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break end + 4;
                }
            };
            let head = String::from_utf8_lossy(&request[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            while request.len() < header_end + content_length {
                let read = socket.read(&mut buf).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            head.lines().next().unwrap_or_default().to_string()
        });
        (url, handle)
    }

    fn backend_at(url: &str, store: MemorySessionStore) -> SupabaseBackend<MemorySessionStore> {
        let config = ClientConfig::new(url, "anon").unwrap();
        SupabaseBackend::new(&config, store).unwrap()
    }

    #[test]
    fn parse_api_error_prefers_message_fields() {
        let body = r#"{"code":"PGRST116","details":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;
        assert_eq!(
            parse_api_error(StatusCode::NOT_ACCEPTABLE, body),
            "JSON object requested, multiple (or no) rows returned"
        );
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            parse_api_error(StatusCode::BAD_REQUEST, body),
            "Invalid login credentials"
        );
    }

    #[test]
    fn parse_api_error_falls_back_to_body_or_status() {
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
    }

    #[tokio::test]
    async fn get_session_without_stored_session_is_none() {
        let config = ClientConfig::new("https://demo.supabase.co", "anon").unwrap();
        let backend = SupabaseBackend::new(&config, MemorySessionStore::default()).unwrap();
        assert!(backend.get_session().await.unwrap().is_none());
        assert!(backend.get_user().await.unwrap().is_none());
        assert!(matches!(
            backend.list_notes("user").await,
            Err(Error::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn get_session_restores_unexpired_stored_session() {
        let store = MemorySessionStore::default();
        store.save_session(&stored_session(i64::MAX / 2)).unwrap();
        let config = ClientConfig::new("https://demo.supabase.co", "anon").unwrap();
        let backend = SupabaseBackend::new(&config, store).unwrap();

        let session = backend.get_session().await.unwrap().unwrap();
        assert_eq!(session.user.id, "user-1");
    }

    #[tokio::test]
    async fn session_near_expiry_is_refreshed() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"access_token":"new-access","refresh_token":"new-refresh","expires_in":3600,"user":{"id":"user-1","email":"a@example.com"}}"#,
        )
        .await;
        let store = MemorySessionStore::default();
        store
            .save_session(&stored_session(crate::util::unix_timestamp_now() + 30))
            .unwrap();
        let backend = backend_at(&url, store.clone());
        let mut subscription = backend.on_auth_state_change();

        let session = backend.get_session().await.unwrap().unwrap();
        assert_eq!(session.access_token, "new-access");
        assert!(!session.is_expired());
        assert!(server
            .await
            .unwrap()
            .starts_with("POST /auth/v1/token?grant_type=refresh_token"));

        let change = subscription.next().await.unwrap();
        assert_eq!(change.event, AuthEvent::TokenRefreshed);
        let saved = store.load_session().unwrap().unwrap();
        assert_eq!(saved.refresh_token, "new-refresh");
        assert_eq!(
            backend.get_session().await.unwrap().unwrap().access_token,
            "new-access"
        );
    }

    #[tokio::test]
    async fn rejected_refresh_clears_session_and_reports_expiry() {
        let (url, server) = serve_once(
            "400 Bad Request",
            r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#,
        )
        .await;
        let store = MemorySessionStore::default();
        store.save_session(&stored_session(0)).unwrap();
        let backend = backend_at(&url, store.clone());
        let mut subscription = backend.on_auth_state_change();

        assert!(backend.get_session().await.unwrap().is_none());
        server.await.unwrap();

        let change = subscription.next().await.unwrap();
        assert_eq!(change.event, AuthEvent::SessionExpired);
        assert!(change.session.is_none());
        assert!(store.load_session().unwrap().is_none());
        assert!(backend.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unreachable_auth_server_keeps_the_stored_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let store = MemorySessionStore::default();
        store.save_session(&stored_session(0)).unwrap();
        let backend = backend_at(&url, store.clone());

        assert!(matches!(backend.get_session().await, Err(Error::Http(_))));
        assert_eq!(
            store.load_session().unwrap().unwrap().refresh_token,
            "refresh"
        );
    }
}
