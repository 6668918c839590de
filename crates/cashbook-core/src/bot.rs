//! Chat command dispatch

use cashbook_parser::ParserRef;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::error::{CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{ChatLink, InboundMessage, LinkCode};
use crate::reply::ReplyComposer;
use crate::service::LendingService;
use crate::store::LinkStoreRef;

/// Upper bound for link code lifetime
const MAX_CODE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Bot command recognised at the start of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Start(Option<&'a str>),
    Help,
    Status,
    Balance(Option<&'a str>),
}

impl<'a> Command<'a> {
    /// `None` for plain text and unknown commands
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, Some(rest.trim()).filter(|r| !r.is_empty())),
            None => (text, None),
        };
        // group chats address commands as /cmd@BotName
        let name = head.split('@').next().unwrap_or(head);
        match name.to_lowercase().as_str() {
            "/start" => Some(Command::Start(rest.and_then(|r| r.split_whitespace().next()))),
            "/help" => Some(Command::Help),
            "/status" => Some(Command::Status),
            "/balance" | "/balances" => Some(Command::Balance(rest)),
            _ => None,
        }
    }
}

/// Turns one inbound chat message into one reply
pub struct BotDispatcher {
    parser: ParserRef,
    service: Arc<LendingService>,
    links: LinkStoreRef,
    replies: ReplyComposer,
    code_ttl: Duration,
    logger: DefaultErrorLogger,
}

impl BotDispatcher {
    pub fn new(
        parser: ParserRef,
        service: Arc<LendingService>,
        links: LinkStoreRef,
        replies: ReplyComposer,
        code_ttl_secs: u64,
    ) -> Self {
        Self {
            parser,
            service,
            links,
            replies,
            code_ttl: Duration::seconds(code_ttl_secs.min(MAX_CODE_TTL_SECS) as i64),
            logger: DefaultErrorLogger,
        }
    }

    pub fn service(&self) -> &Arc<LendingService> {
        &self.service
    }

    /// Issue a link code for the user to send as `/start <code>`
    pub async fn issue_link_code(&self, user_id: &str, now: DateTime<Utc>) -> CoreResult<LinkCode> {
        let code = self.links.create_link_code(user_id, self.code_ttl, now).await?;
        log::info!("Issued link code for user {}", user_id);
        Ok(code)
    }

    pub async fn link_status(&self, user_id: &str) -> CoreResult<Option<ChatLink>> {
        self.links.link_for_user(user_id).await
    }

    pub async fn unlink(&self, user_id: &str) -> CoreResult<bool> {
        self.links.unlink(user_id).await
    }

    /// Always yields a reply; failures become failure texts
    pub async fn handle(&self, message: &InboundMessage, now: DateTime<Utc>) -> String {
        let text = message.text.trim();
        let context = ErrorContext::new("handle_message").with_chat_id(&message.chat_id);

        let link = match self.links.linked_user(&message.chat_id).await {
            Ok(link) => link,
            Err(e) => {
                self.logger.log_error(&e, &context);
                return self.replies.internal_error();
            }
        };

        match Command::parse(text) {
            Some(Command::Start(Some(code))) => self.link_chat(message, code, now).await,
            Some(Command::Start(None)) => match link {
                Some(_) => self.replies.welcome_back(),
                None => self.replies.onboarding(),
            },
            Some(Command::Help) => self.replies.help(),
            Some(Command::Status) => self.replies.status(link.as_ref()),
            Some(Command::Balance(query)) => match link {
                Some(link) => self.balances(&link, query).await,
                None => self.replies.link_required(),
            },
            None => match link {
                Some(link) => self.record(&link, text, now).await,
                None => self.replies.link_required(),
            },
        }
    }

    async fn link_chat(&self, message: &InboundMessage, code: &str, now: DateTime<Utc>) -> String {
        let result = self
            .links
            .verify_and_link(code, &message.chat_id, message.username.as_deref(), now)
            .await;

        match &result {
            Ok(link) => {
                log::info!("Linked chat {} to user {}", link.chat_id, link.user_id);
                if let Err(e) = self.service.lendings_ledger(&link.user_id).await {
                    log::warn!("Ledger not prepared for user {}: {}", link.user_id, e);
                }
            }
            Err(e) => log::debug!("Link attempt from chat {} rejected: {}", message.chat_id, e),
        }
        self.replies.link_result(&result)
    }

    async fn balances(&self, link: &ChatLink, query: Option<&str>) -> String {
        match self.service.overview(&link.user_id, query).await {
            Ok(overview) => self.replies.balances(&overview, query),
            Err(e) => {
                self.logger.log_error(
                    &e,
                    &ErrorContext::new("balances")
                        .with_user_id(&link.user_id)
                        .with_chat_id(&link.chat_id),
                );
                self.replies.internal_error()
            }
        }
    }

    async fn record(&self, link: &ChatLink, text: &str, now: DateTime<Utc>) -> String {
        let today = now.date_naive();
        let parsed = match self.parser.try_parse(text, today) {
            Ok(parsed) => parsed,
            Err(reason) => {
                log::debug!("Not a lending message from chat {}: {}", link.chat_id, reason);
                return self.replies.format_hint();
            }
        };

        match self.service.record(&parsed, &link.user_id).await {
            Ok(recorded) => self.replies.recorded(&recorded, today),
            Err(e) => self.replies.record_failed(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::service::tests::FlakyStore;
    use crate::store::{LedgerStore, LinkStore};
    use cashbook_config::LendingsConfig;
    use cashbook_parser::DefaultLendingParser;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    fn dispatcher(store: Arc<FlakyStore>, links: Arc<MemoryStore>) -> BotDispatcher {
        let service = LendingService::new(LendingsConfig::default(), store.clone(), store);
        BotDispatcher::new(
            Arc::new(DefaultLendingParser),
            Arc::new(service),
            links,
            ReplyComposer::default(),
            600,
        )
    }

    async fn linked_dispatcher(store: Arc<FlakyStore>) -> BotDispatcher {
        let links = Arc::new(MemoryStore::new());
        let bot = dispatcher(store, links);
        let code = bot.issue_link_code("u1", now()).await.unwrap();
        let reply = bot
            .handle(&InboundMessage::new("42", format!("/start {}", code.code)), now())
            .await;
        assert!(reply.starts_with("✅ Account linked successfully!"));
        bot
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("/start"), Some(Command::Start(None)));
        assert_eq!(Command::parse("/start 123456"), Some(Command::Start(Some("123456"))));
        assert_eq!(Command::parse("/start@CashBookBot  654321 "), Some(Command::Start(Some("654321"))));
        assert_eq!(Command::parse(" /HELP "), Some(Command::Help));
        assert_eq!(Command::parse("/balance john"), Some(Command::Balance(Some("john"))));
        assert_eq!(Command::parse("/balance"), Some(Command::Balance(None)));
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("gave john 500"), None);
    }

    #[tokio::test]
    async fn test_unlinked_chat_gets_link_prompt() {
        let bot = dispatcher(Arc::new(FlakyStore::default()), Arc::new(MemoryStore::new()));

        let reply = bot.handle(&InboundMessage::new("42", "gave john 500"), now()).await;
        assert!(reply.starts_with("⚠️ Please link your account first!"));

        let reply = bot.handle(&InboundMessage::new("42", "/start"), now()).await;
        assert!(reply.contains("Welcome to CashBook"));

        let reply = bot.handle(&InboundMessage::new("42", "/status"), now()).await;
        assert!(reply.contains("not linked"));

        let reply = bot.handle(&InboundMessage::new("42", "/help"), now()).await;
        assert!(reply.contains("/balance"));
    }

    #[tokio::test]
    async fn test_start_with_code_links_chat() {
        let store = Arc::new(FlakyStore::default());
        let bot = linked_dispatcher(store.clone()).await;

        let reply = bot.handle(&InboundMessage::new("42", "/status"), now()).await;
        assert!(reply.starts_with("✅ Your account is linked!"));
        let reply = bot.handle(&InboundMessage::new("42", "/start"), now()).await;
        assert!(reply.starts_with("👋 Welcome back!"));

        // linking prepares the ledger
        assert!(store.inner.find_ledger("u1", "LENDINGS").await.unwrap().is_some());
        assert_eq!(bot.link_status("u1").await.unwrap().unwrap().chat_id, "42");
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let links = Arc::new(MemoryStore::new());
        let bot = dispatcher(Arc::new(FlakyStore::default()), links.clone());
        let code = bot.issue_link_code("u1", now()).await.unwrap();

        let later = now() + Duration::seconds(601);
        let reply = bot
            .handle(&InboundMessage::new("42", format!("/start {}", code.code)), later)
            .await;
        assert!(reply.contains("Code expired"));
        assert!(links.linked_user("42").await.unwrap().is_none());

        let reply = bot.handle(&InboundMessage::new("42", "/start 000000"), now()).await;
        assert!(reply.contains("Invalid code"));
    }

    #[tokio::test]
    async fn test_lending_message_is_recorded() {
        let store = Arc::new(FlakyStore::default());
        let bot = linked_dispatcher(store).await;

        let reply = bot
            .handle(&InboundMessage::new("42", "gave john 1.5k tomorrow"), now())
            .await;
        assert_eq!(reply, "✅ Recorded: Lent ₹1,500 to John\n📅 Due: 11 Jan");

        let reply = bot.handle(&InboundMessage::new("42", "got john 500"), now()).await;
        assert_eq!(reply, "✅ Recorded: Received ₹500 from John");

        let balances = bot.service().balances("u1").await.unwrap();
        assert_eq!(balances[0].balance, dec!(1000));

        let reply = bot.handle(&InboundMessage::new("42", "/balance jo"), now()).await;
        assert!(reply.contains("• John owes you ₹1,000"));
    }

    #[tokio::test]
    async fn test_unparsable_message_gets_format_hint() {
        let bot = linked_dispatcher(Arc::new(FlakyStore::default())).await;
        let reply = bot.handle(&InboundMessage::new("42", "hello"), now()).await;
        assert!(reply.starts_with("❓ Could not understand the message."));
    }

    #[tokio::test]
    async fn test_store_failure_gets_failure_reply() {
        let store = Arc::new(FlakyStore {
            fail_transaction: true,
            ..Default::default()
        });
        let bot = linked_dispatcher(store).await;
        let reply = bot.handle(&InboundMessage::new("42", "gave john 500"), now()).await;
        assert_eq!(reply, "❌ Failed to create transaction.");
    }
}
