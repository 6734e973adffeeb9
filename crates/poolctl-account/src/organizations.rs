//! AWS Organizations binding for [`AccountProvider`]

use std::collections::BTreeMap;
use std::error::Error as StdError;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_organizations::error::DisplayErrorContext;
use aws_sdk_organizations::types::Tag;
use aws_sdk_organizations::Client;
use tracing::debug;

use crate::provider::{
    Account, AccountProvider, AccountStatus, CreateAccountState, CreateAccountStatus,
};
use poolctl_common::{Error, Result};

/// Map an SDK error into a provider error carrying the full error chain
fn sdk_err<E: StdError>(operation: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::provider(operation, DisplayErrorContext(&e).to_string())
}

/// Account provider backed by the AWS Organizations API
pub struct OrganizationsProvider {
    client: Client,
}

impl OrganizationsProvider {
    /// Wrap an existing Organizations client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential chain, optionally
    /// selecting a named profile
    pub async fn from_env(profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl AccountProvider for OrganizationsProvider {
    async fn list_accounts(&self, parent_ou: &str) -> Result<Vec<Account>> {
        let mut accounts = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_accounts_for_parent()
                .parent_id(parent_ou)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_err("ListAccountsForParent"))?;

            accounts.extend(output.accounts().iter().filter_map(|a| {
                Some(Account {
                    id: a.id()?.to_string(),
                    name: a.name().unwrap_or_default().to_string(),
                    email: a.email().unwrap_or_default().to_string(),
                    status: a
                        .status()
                        .map(|s| AccountStatus::parse(s.as_str()))
                        .unwrap_or_else(|| AccountStatus::Other(String::new())),
                })
            }));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(parent_ou = %parent_ou, count = accounts.len(), "Listed accounts");
        Ok(accounts)
    }

    async fn account_tags(&self, account_id: &str) -> Result<BTreeMap<String, String>> {
        let mut tags = BTreeMap::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_tags_for_resource()
                .resource_id(account_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_err("ListTagsForResource"))?;

            for tag in output.tags() {
                tags.insert(tag.key().to_string(), tag.value().to_string());
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(tags)
    }

    async fn account_status(&self, account_id: &str) -> Result<AccountStatus> {
        let output = self
            .client
            .describe_account()
            .account_id(account_id)
            .send()
            .await
            .map_err(sdk_err("DescribeAccount"))?;

        output
            .account()
            .and_then(|a| a.status())
            .map(|s| AccountStatus::parse(s.as_str()))
            .ok_or_else(|| {
                Error::provider(
                    "DescribeAccount",
                    format!("no status returned for account {account_id}"),
                )
            })
    }

    async fn create_account(&self, name: &str, email: &str) -> Result<String> {
        let output = self
            .client
            .create_account()
            .account_name(name)
            .email(email)
            .send()
            .await
            .map_err(sdk_err("CreateAccount"))?;

        output
            .create_account_status()
            .and_then(|s| s.id())
            .map(str::to_string)
            .ok_or_else(|| Error::provider("CreateAccount", "no request id returned"))
    }

    async fn create_account_status(&self, request_id: &str) -> Result<CreateAccountStatus> {
        let output = self
            .client
            .describe_create_account_status()
            .create_account_request_id(request_id)
            .send()
            .await
            .map_err(sdk_err("DescribeCreateAccountStatus"))?;

        let status = output.create_account_status().ok_or_else(|| {
            Error::provider(
                "DescribeCreateAccountStatus",
                format!("no status returned for request {request_id}"),
            )
        })?;

        Ok(CreateAccountStatus {
            request_id: status.id().unwrap_or(request_id).to_string(),
            state: status
                .state()
                .map(|s| CreateAccountState::parse(s.as_str()))
                .unwrap_or(CreateAccountState::InProgress),
            account_id: status.account_id().map(str::to_string),
            failure_reason: status.failure_reason().map(|r| r.as_str().to_string()),
        })
    }

    async fn tag_account(&self, account_id: &str, tags: &BTreeMap<String, String>) -> Result<()> {
        let tags = tags
            .iter()
            .map(|(k, v)| {
                Tag::builder()
                    .key(k)
                    .value(v)
                    .build()
                    .map_err(|e| Error::validation(format!("invalid tag {k}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        self.client
            .tag_resource()
            .resource_id(account_id)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(sdk_err("TagResource"))?;
        Ok(())
    }

    async fn untag_account(&self, account_id: &str, keys: &[String]) -> Result<()> {
        self.client
            .untag_resource()
            .resource_id(account_id)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(sdk_err("UntagResource"))?;
        Ok(())
    }

    async fn move_account(&self, account_id: &str, from_ou: &str, to_ou: &str) -> Result<()> {
        self.client
            .move_account()
            .account_id(account_id)
            .source_parent_id(from_ou)
            .destination_parent_id(to_ou)
            .send()
            .await
            .map_err(sdk_err("MoveAccount"))?;
        Ok(())
    }
}
