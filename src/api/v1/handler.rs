use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use warp::reject;
use warp::reply::Json;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

type Reply = Result<Json, warp::Rejection>;

fn ok<T: Serialize>(data: T) -> Reply {
    Ok(warp::reply::json(&ApiResponse::ok(data)))
}

/// Runs one service call under the request deadline. An expired deadline drops the call,
/// which rolls back any batch it had open.
async fn within<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, RelationError>>,
) -> Result<T, warp::Rejection> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(reject::custom(ApiFailure::from(e))),
        Err(_) => Err(reject::custom(ApiFailure::deadline_exceeded())),
    }
}

fn parse_id<T: FromStr>(field: &str, raw: &str) -> Result<T, warp::Rejection> {
    raw.parse::<T>().map_err(|_| {
        reject::custom(ApiFailure::invalid_argument(format!(
            "{field} is not a valid id: {raw:?}"
        )))
    })
}

fn parse_cursor(raw: Option<&str>) -> Result<PageCursor, warp::Rejection> {
    PageCursor::decode(raw.unwrap_or_default())
        .map_err(|e| reject::custom(ApiFailure::invalid_argument(e.to_string())))
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    /// Empty when this is the last page.
    pub next_cursor: String,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        PageResponse {
            next_cursor: page.next.encode(),
            items: page.items,
        }
    }
}

#[derive(Debug, Serialize)]
struct CountResponse {
    count: i64,
}

#[derive(Debug, Serialize)]
struct CountsResponse {
    counts: HashMap<String, i64>,
}

// region friends

#[derive(Debug, Deserialize)]
pub struct FriendRequestBody {
    pub requester: String,
    pub target: String,
}

pub async fn create_friend_request(
    body: FriendRequestBody,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let requester: UserId = parse_id("requester", &body.requester)?;
    let target: UserId = parse_id("target", &body.target)?;

    let edge = within(
        timeout,
        friend_service.create_friend_request(requester, target),
    )
    .await?;
    ok(edge)
}

/// `owner` received the request from `peer`.
#[derive(Debug, Deserialize)]
pub struct PendingRequestBody {
    pub owner: String,
    pub peer: String,
}

pub async fn accept_friend_request(
    body: PendingRequestBody,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let owner: UserId = parse_id("owner", &body.owner)?;
    let peer: UserId = parse_id("peer", &body.peer)?;

    within(timeout, friend_service.accept_friend_request(owner, peer)).await?;
    ok(())
}

pub async fn decline_friend_request(
    body: PendingRequestBody,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let owner: UserId = parse_id("owner", &body.owner)?;
    let peer: UserId = parse_id("peer", &body.peer)?;

    within(timeout, friend_service.decline_friend_request(owner, peer)).await?;
    ok(())
}

#[derive(Debug, Deserialize)]
pub struct UserPairQuery {
    pub a: String,
    pub b: String,
}

pub async fn remove_friend_relation(
    body: UserPairQuery,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let a: UserId = parse_id("a", &body.a)?;
    let b: UserId = parse_id("b", &body.b)?;

    within(timeout, friend_service.remove_friend_relation(a, b)).await?;
    ok(())
}

pub async fn get_friend_relation(
    query: UserPairQuery,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let a: UserId = parse_id("a", &query.a)?;
    let b: UserId = parse_id("b", &query.b)?;

    let edge = within(timeout, friend_service.get_friend_relation(a, b)).await?;
    ok(edge)
}

#[derive(Debug, Deserialize)]
pub struct UserPageQuery {
    pub user_id: String,
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: PageSize,
}

pub async fn get_friends_of_user(
    query: UserPageQuery,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &query.user_id)?;
    let cursor = parse_cursor(query.cursor.as_deref())?;

    let page = within(
        timeout,
        friend_service.get_friends_of_user(user_id, &cursor, query.limit),
    )
    .await?;
    ok(PageResponse::from(page))
}

pub async fn get_incoming_friend_requests(
    query: UserPageQuery,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &query.user_id)?;
    let cursor = parse_cursor(query.cursor.as_deref())?;

    let page = within(
        timeout,
        friend_service.get_incoming_friend_requests(user_id, &cursor, query.limit),
    )
    .await?;
    ok(PageResponse::from(page))
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

pub async fn get_friend_count(
    query: UserQuery,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &query.user_id)?;

    let count = within(timeout, friend_service.get_friend_count(user_id)).await?;
    ok(CountResponse { count })
}

#[derive(Debug, Deserialize)]
pub struct UserIdsBody {
    pub user_ids: Vec<String>,
}

pub async fn get_many_friend_count(
    body: UserIdsBody,
    friend_service: Arc<dyn FriendService>,
    timeout: Duration,
) -> Reply {
    let user_ids = body
        .user_ids
        .iter()
        .map(|raw| parse_id::<UserId>("user_ids", raw))
        .collect::<Result<Vec<_>, _>>()?;

    let counts = within(timeout, friend_service.get_many_friend_count(&user_ids)).await?;
    ok(CountsResponse {
        counts: counts
            .into_iter()
            .map(|(id, count)| (id.to_string(), count))
            .collect(),
    })
}

// endregion

// region favorites

#[derive(Debug, Deserialize)]
pub struct FavoriteBody {
    pub user_id: String,
    pub party_id: String,
}

pub async fn favor_party(
    body: FavoriteBody,
    favorite_service: Arc<dyn FavoriteService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &body.user_id)?;
    let party_id: PartyId = parse_id("party_id", &body.party_id)?;

    let edge = within(timeout, favorite_service.favor_party(user_id, party_id)).await?;
    ok(edge)
}

pub async fn defavor_party(
    body: FavoriteBody,
    favorite_service: Arc<dyn FavoriteService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &body.user_id)?;
    let party_id: PartyId = parse_id("party_id", &body.party_id)?;

    within(timeout, favorite_service.defavor_party(user_id, party_id)).await?;
    ok(())
}

pub async fn get_favorite_parties_by_user(
    query: UserPageQuery,
    favorite_service: Arc<dyn FavoriteService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &query.user_id)?;
    let cursor = parse_cursor(query.cursor.as_deref())?;

    let page = within(
        timeout,
        favorite_service.get_favorite_parties_by_user(user_id, &cursor, query.limit),
    )
    .await?;
    ok(PageResponse::from(page))
}

#[derive(Debug, Deserialize)]
pub struct PartyPageQuery {
    pub party_id: String,
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: PageSize,
}

pub async fn get_favorising_users_by_party(
    query: PartyPageQuery,
    favorite_service: Arc<dyn FavoriteService>,
    timeout: Duration,
) -> Reply {
    let party_id: PartyId = parse_id("party_id", &query.party_id)?;
    let cursor = parse_cursor(query.cursor.as_deref())?;

    let page = within(
        timeout,
        favorite_service.get_favorising_users_by_party(party_id, &cursor, query.limit),
    )
    .await?;
    ok(PageResponse::from(page))
}

#[derive(Debug, Deserialize)]
pub struct PartyQuery {
    pub party_id: String,
}

pub async fn get_favorite_party_count(
    query: PartyQuery,
    favorite_service: Arc<dyn FavoriteService>,
    timeout: Duration,
) -> Reply {
    let party_id: PartyId = parse_id("party_id", &query.party_id)?;

    let count = within(timeout, favorite_service.get_favorite_party_count(party_id)).await?;
    ok(CountResponse { count })
}

#[derive(Debug, Deserialize)]
pub struct PartyIdsBody {
    pub party_ids: Vec<String>,
}

pub async fn get_many_favorite_party_count(
    body: PartyIdsBody,
    favorite_service: Arc<dyn FavoriteService>,
    timeout: Duration,
) -> Reply {
    let party_ids = body
        .party_ids
        .iter()
        .map(|raw| parse_id::<PartyId>("party_ids", raw))
        .collect::<Result<Vec<_>, _>>()?;

    let counts = within(
        timeout,
        favorite_service.get_many_favorite_party_count(&party_ids),
    )
    .await?;
    ok(CountsResponse {
        counts: counts
            .into_iter()
            .map(|(id, count)| (id.to_string(), count))
            .collect(),
    })
}

// endregion

// region party participation

#[derive(Debug, Deserialize)]
pub struct InviteBody {
    pub user_id: String,
    pub inviter_id: String,
    pub party_id: String,
    pub valid_for_secs: u64,
}

pub async fn invite(
    body: InviteBody,
    participation_service: Arc<dyn ParticipationService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &body.user_id)?;
    let inviter_id: UserId = parse_id("inviter_id", &body.inviter_id)?;
    let party_id: PartyId = parse_id("party_id", &body.party_id)?;

    let invite = within(
        timeout,
        participation_service.invite(
            user_id,
            inviter_id,
            party_id,
            Duration::from_secs(body.valid_for_secs),
        ),
    )
    .await?;
    ok(invite)
}

/// Shared by decline, accept, join and leave.
#[derive(Debug, Deserialize)]
pub struct MembershipBody {
    pub user_id: String,
    pub party_id: String,
}

impl MembershipBody {
    fn ids(&self) -> Result<(UserId, PartyId), warp::Rejection> {
        Ok((
            parse_id("user_id", &self.user_id)?,
            parse_id("party_id", &self.party_id)?,
        ))
    }
}

pub async fn decline_invite(
    body: MembershipBody,
    participation_service: Arc<dyn ParticipationService>,
    timeout: Duration,
) -> Reply {
    let (user_id, party_id) = body.ids()?;

    within(timeout, participation_service.decline(user_id, party_id)).await?;
    ok(())
}

pub async fn accept_invite(
    body: MembershipBody,
    participation_service: Arc<dyn ParticipationService>,
    timeout: Duration,
) -> Reply {
    let (user_id, party_id) = body.ids()?;

    let participant = within(timeout, participation_service.accept(user_id, party_id)).await?;
    ok(participant)
}

pub async fn join_party(
    body: MembershipBody,
    participation_service: Arc<dyn ParticipationService>,
    timeout: Duration,
) -> Reply {
    let (user_id, party_id) = body.ids()?;

    let participant = within(timeout, participation_service.join(user_id, party_id)).await?;
    ok(participant)
}

pub async fn leave_party(
    body: MembershipBody,
    participation_service: Arc<dyn ParticipationService>,
    timeout: Duration,
) -> Reply {
    let (user_id, party_id) = body.ids()?;

    within(timeout, participation_service.leave(user_id, party_id)).await?;
    ok(())
}

pub async fn get_user_invites(
    query: UserPageQuery,
    participation_service: Arc<dyn ParticipationService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &query.user_id)?;
    let cursor = parse_cursor(query.cursor.as_deref())?;

    let page = within(
        timeout,
        participation_service.get_user_invites(user_id, &cursor, query.limit),
    )
    .await?;
    ok(PageResponse::from(page))
}

pub async fn get_party_participants(
    query: PartyPageQuery,
    participation_service: Arc<dyn ParticipationService>,
    timeout: Duration,
) -> Reply {
    let party_id: PartyId = parse_id("party_id", &query.party_id)?;
    let cursor = parse_cursor(query.cursor.as_deref())?;

    let page = within(
        timeout,
        participation_service.get_party_participants(party_id, &cursor, query.limit),
    )
    .await?;
    ok(PageResponse::from(page))
}

pub async fn get_user_parties(
    query: UserPageQuery,
    participation_service: Arc<dyn ParticipationService>,
    timeout: Duration,
) -> Reply {
    let user_id: UserId = parse_id("user_id", &query.user_id)?;
    let cursor = parse_cursor(query.cursor.as_deref())?;

    let page = within(
        timeout,
        participation_service.get_user_parties(user_id, &cursor, query.limit),
    )
    .await?;
    ok(PageResponse::from(page))
}

// endregion

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Filter;

    #[tokio::test]
    async fn call_past_the_deadline_is_504() {
        let route = warp::any()
            .and_then(|| async {
                within(
                    Duration::from_millis(5),
                    std::future::pending::<Result<(), RelationError>>(),
                )
                .await?;
                ok(())
            })
            .recover(recover_error);

        let res = warp::test::request().path("/").reply(&route).await;

        assert_eq!(res.status(), 504);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"]["code"], "DeadlineExceeded");
    }

    #[tokio::test]
    async fn call_inside_the_deadline_keeps_its_result() {
        let value = within(Duration::from_secs(1), async { Ok::<_, RelationError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
