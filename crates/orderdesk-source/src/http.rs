use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;

use orderdesk_core::config::SourceConfig;
use orderdesk_core::Order;

use crate::contracts::SourceError;
use crate::contracts::SubmitOutcome;
use crate::source::OrderSource;

#[derive(Debug, Clone)]
pub struct HttpOrderSource {
    client: Client,
    orders_url: String,
    submit_url: String,
}

impl HttpOrderSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| SourceError::Client(err.to_string()))?;
        Ok(Self {
            client,
            orders_url: config.orders_url(),
            submit_url: config.submit_url(),
        })
    }
}

impl OrderSource for HttpOrderSource {
    fn label(&self) -> &str {
        &self.orders_url
    }

    fn fetch(&self) -> Result<String, SourceError> {
        tracing::debug!(url = %self.orders_url, "fetching orders");
        let response = self
            .client
            .get(&self.orders_url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|err| SourceError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.orders_url, status = status.as_u16(), "order fetch rejected");
            return Err(SourceError::Status(status.as_u16()));
        }

        response
            .text()
            .map_err(|err| SourceError::Transport(err.to_string()))
    }

    fn submit(&self, order: &Order) -> SubmitOutcome {
        tracing::debug!(url = %self.submit_url, order_id = %order.id(), "submitting order");
        let response = match self.client.post(&self.submit_url).json(order).send() {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(order_id = %order.id(), error = %err, "order submit failed");
                return SubmitOutcome::NetworkFailure {
                    message: err.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            return SubmitOutcome::Accepted;
        }
        if status == StatusCode::CONFLICT {
            let body = response.text().unwrap_or_default();
            let message = if body.trim().is_empty() {
                "conflict".to_string()
            } else {
                body.trim().to_string()
            };
            return SubmitOutcome::Conflict { message };
        }
        SubmitOutcome::Rejected {
            status: status.as_u16(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufRead;
    use std::io::BufReader;
    use std::io::Read;
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use orderdesk_core::fixture::FIXTURE_ORDERS_JSON;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::source::fetch_orders;

    struct Captured {
        request_line: String,
        body: String,
    }

    /// Serves exactly one canned response on a loopback port.
    fn serve_once(status: &str, body: &str) -> (SourceConfig, mpsc::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if let Some(value) = lower.strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            let _ = tx.send(Captured {
                request_line: request_line.trim().to_string(),
                body: String::from_utf8(body).unwrap(),
            });
        });

        let config = SourceConfig {
            base_url: format!("http://127.0.0.1:{port}"),
            use_fixture: false,
            timeout_secs: 5,
            ..SourceConfig::default()
        };
        (config, rx)
    }

    #[test]
    fn fetch_accepts_wrapped_payload() {
        let (config, rx) = serve_once("200 OK", FIXTURE_ORDERS_JSON);
        let source = HttpOrderSource::new(&config).unwrap();

        let orders = fetch_orders(&source).unwrap();

        assert_eq!(orders.len(), 3);
        assert_eq!(rx.recv().unwrap().request_line, "GET /orders HTTP/1.1");
    }

    #[test]
    fn fetch_accepts_bare_payload() {
        let (config, _rx) = serve_once(
            "200 OK",
            r#"[{"id":"ORD-1","customer_name":"Ann","timestamp":"2025-01-15T10:24:30Z"}]"#,
        );
        let source = HttpOrderSource::new(&config).unwrap();
        let orders = fetch_orders(&source).unwrap();
        assert_eq!(orders[0].id(), "ORD-1");
    }

    #[test]
    fn non_success_status_is_an_error() {
        let (config, _rx) = serve_once("404 Not Found", "{}");
        let source = HttpOrderSource::new(&config).unwrap();
        assert_eq!(source.fetch(), Err(SourceError::Status(404)));
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = SourceConfig {
            base_url: format!("http://127.0.0.1:{port}"),
            use_fixture: false,
            timeout_secs: 2,
            ..SourceConfig::default()
        };
        let source = HttpOrderSource::new(&config).unwrap();
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));
    }

    #[test]
    fn submit_posts_canonical_order() {
        let (config, rx) = serve_once("201 Created", "{}");
        let source = HttpOrderSource::new(&config).unwrap();
        let order = orderdesk_core::fixture::fixture_orders().unwrap().remove(0);

        assert_eq!(source.submit(&order), SubmitOutcome::Accepted);

        let captured = rx.recv().unwrap();
        assert_eq!(captured.request_line, "POST /add-order HTTP/1.1");
        let posted: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(posted["id"], "ORD-1001");
        assert_eq!(posted["customerName"], "Alice Johnson");
        assert_eq!(posted["itemCount"], 2);
    }

    #[test]
    fn submit_conflict_carries_body() {
        let (config, _rx) = serve_once("409 Conflict", "already submitted");
        let source = HttpOrderSource::new(&config).unwrap();
        let order = orderdesk_core::fixture::fixture_orders().unwrap().remove(1);

        assert_eq!(
            source.submit(&order),
            SubmitOutcome::Conflict {
                message: "already submitted".to_string()
            }
        );
    }

    #[test]
    fn submit_server_error_is_rejected() {
        let (config, _rx) = serve_once("500 Internal Server Error", "");
        let source = HttpOrderSource::new(&config).unwrap();
        let order = orderdesk_core::fixture::fixture_orders().unwrap().remove(2);

        assert_eq!(source.submit(&order), SubmitOutcome::Rejected { status: 500 });
    }
}
