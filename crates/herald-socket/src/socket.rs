use std::sync::Arc;

use tracing::info;

use herald_crypto::{MessageDecryptor, OwnIdentity};
use herald_types::{
    BinaryNode, LiveUpdates, MessageCounters, MessageSource, NewsletterMetadata, ReactionMode,
    ViewRole,
};

use crate::config::NewsletterConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::metadata::{
    MetadataKind, extract_admin_count, extract_live_updates, extract_newsletter_metadata,
};
use crate::parser::{MessageUpdate, parse_message_batch, parse_message_counters};
use crate::picture::{MediaUpload, PictureDeriver, encode_picture};
use crate::request::{NewsletterRequest, check_jid};
use crate::transport::Transport;

/// Newsletter operations on top of a borrowed transport and decryptor.
pub struct NewsletterSocket<T, D> {
    dispatcher: Dispatcher<T>,
    decryptor: Arc<D>,
    me: OwnIdentity,
    config: NewsletterConfig,
}

impl<T, D> Clone for NewsletterSocket<T, D> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            decryptor: Arc::clone(&self.decryptor),
            me: self.me.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T: Transport, D: MessageDecryptor> NewsletterSocket<T, D> {
    pub fn new(
        transport: Arc<T>,
        decryptor: Arc<D>,
        me: OwnIdentity,
        config: NewsletterConfig,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport, config.server_jid.clone()),
            decryptor,
            me,
            config,
        }
    }

    pub fn config(&self) -> &NewsletterConfig {
        &self.config
    }

    async fn execute(&self, request: NewsletterRequest) -> Result<BinaryNode> {
        request.validate()?;
        let wire = request.into_wire(self.dispatcher.server_jid());
        self.dispatcher.send(wire).await
    }

    /// Asks the server to push live view and reaction updates for a channel.
    pub async fn subscribe_updates(&self, jid: &str) -> Result<LiveUpdates> {
        let reply = self
            .execute(NewsletterRequest::SubscribeUpdates { jid: jid.into() })
            .await?;
        extract_live_updates(&reply)
    }

    pub async fn reaction_mode(&self, jid: &str, mode: ReactionMode) -> Result<()> {
        self.execute(NewsletterRequest::ReactionMode {
            jid: jid.into(),
            mode,
        })
        .await?;
        Ok(())
    }

    /// `None` clears the description.
    pub async fn update_description(&self, jid: &str, description: Option<&str>) -> Result<()> {
        self.execute(NewsletterRequest::UpdateDescription {
            jid: jid.into(),
            description: description.map(str::to_string),
        })
        .await?;
        Ok(())
    }

    pub async fn update_name(&self, jid: &str, name: &str) -> Result<()> {
        self.execute(NewsletterRequest::UpdateName {
            jid: jid.into(),
            name: name.into(),
        })
        .await?;
        Ok(())
    }

    pub async fn update_picture<P: PictureDeriver>(
        &self,
        jid: &str,
        deriver: &P,
        media: MediaUpload,
    ) -> Result<()> {
        check_jid(jid)?;
        let image = deriver.derive_picture(media).await?;
        self.execute(NewsletterRequest::UpdatePicture {
            jid: jid.into(),
            picture: encode_picture(&image),
        })
        .await?;
        Ok(())
    }

    pub async fn remove_picture(&self, jid: &str) -> Result<()> {
        self.execute(NewsletterRequest::RemovePicture { jid: jid.into() })
            .await?;
        Ok(())
    }

    pub async fn follow(&self, jid: &str) -> Result<()> {
        self.execute(NewsletterRequest::Follow { jid: jid.into() })
            .await?;
        Ok(())
    }

    pub async fn unfollow(&self, jid: &str) -> Result<()> {
        self.execute(NewsletterRequest::Unfollow { jid: jid.into() })
            .await?;
        Ok(())
    }

    pub async fn mute(&self, jid: &str) -> Result<()> {
        self.execute(NewsletterRequest::Mute { jid: jid.into() })
            .await?;
        Ok(())
    }

    pub async fn unmute(&self, jid: &str) -> Result<()> {
        self.execute(NewsletterRequest::Unmute { jid: jid.into() })
            .await?;
        Ok(())
    }

    pub async fn create(&self, name: &str, description: &str) -> Result<NewsletterMetadata> {
        let reply = self
            .execute(NewsletterRequest::Create {
                name: name.into(),
                description: description.into(),
            })
            .await?;
        let metadata = extract_newsletter_metadata(&reply, MetadataKind::Create)?;
        info!("Created newsletter {} ({})", metadata.id, metadata.name);
        Ok(metadata)
    }

    pub async fn metadata(&self, jid: &str, role: ViewRole) -> Result<NewsletterMetadata> {
        let reply = self
            .execute(NewsletterRequest::Metadata {
                jid: jid.into(),
                role,
            })
            .await?;
        extract_newsletter_metadata(&reply, MetadataKind::Lookup)
    }

    pub async fn admin_count(&self, jid: &str) -> Result<u64> {
        let reply = self
            .execute(NewsletterRequest::AdminCount { jid: jid.into() })
            .await?;
        extract_admin_count(&reply)
    }

    pub async fn change_owner(&self, jid: &str, user_id: &str) -> Result<()> {
        self.execute(NewsletterRequest::ChangeOwner {
            jid: jid.into(),
            user_id: user_id.into(),
        })
        .await?;
        info!("Transferred ownership of newsletter {} to {}", jid, user_id);
        Ok(())
    }

    pub async fn demote(&self, jid: &str, user_id: &str) -> Result<()> {
        self.execute(NewsletterRequest::Demote {
            jid: jid.into(),
            user_id: user_id.into(),
        })
        .await?;
        Ok(())
    }

    pub async fn delete(&self, jid: &str) -> Result<()> {
        self.execute(NewsletterRequest::Delete { jid: jid.into() })
            .await?;
        info!("Deleted newsletter {}", jid);
        Ok(())
    }

    /// Reacts to a post. Without a code any existing reaction is removed.
    pub async fn react_message(&self, jid: &str, server_id: &str, code: Option<&str>) -> Result<()> {
        self.execute(NewsletterRequest::React {
            jid: jid.into(),
            server_id: server_id.into(),
            code: code.map(str::to_string),
        })
        .await?;
        Ok(())
    }

    /// Fetches up to `count` posts after server id `after`, decrypting each.
    pub async fn fetch_messages(
        &self,
        source: MessageSource,
        count: u32,
        after: u64,
    ) -> Result<Vec<MessageUpdate>> {
        let reply = self
            .execute(NewsletterRequest::FetchMessages {
                source,
                count,
                after,
            })
            .await?;
        parse_message_batch(
            &reply,
            self.decryptor.as_ref(),
            &self.me,
            self.config.decrypt_concurrency,
        )
        .await
    }

    /// Counter changes on posts since the `since` timestamp.
    pub async fn fetch_message_updates(
        &self,
        jid: &str,
        count: u32,
        after: u64,
        since: u64,
    ) -> Result<Vec<MessageCounters>> {
        let reply = self
            .execute(NewsletterRequest::FetchMessageUpdates {
                jid: jid.into(),
                count,
                after,
                since,
            })
            .await?;
        parse_message_counters(&reply)
    }
}
