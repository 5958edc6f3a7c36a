use super::handler;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;
use warp::filters::BoxedFilter;
use warp::reply::Json;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    friend_routes(&server)
        .or(favorite_routes(&server))
        .unify()
        .or(party_routes(&server))
        .unify()
}

fn friend_routes(server: &Server) -> BoxedFilter<(Json,)> {
    let friends = with(server.friend_service.clone());
    let timeout = with_timeout(server.request_timeout);

    let create_request = warp::post()
        .and(warp::path("friend_requests"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(friends.clone())
        .and(timeout.clone())
        .and_then(handler::create_friend_request);

    let accept_request = warp::post()
        .and(warp::path!("friend_requests" / "accept"))
        .and(warp::body::json())
        .and(friends.clone())
        .and(timeout.clone())
        .and_then(handler::accept_friend_request);

    let decline_request = warp::post()
        .and(warp::path!("friend_requests" / "decline"))
        .and(warp::body::json())
        .and(friends.clone())
        .and(timeout.clone())
        .and_then(handler::decline_friend_request);

    let incoming_requests = warp::get()
        .and(warp::path("friend_requests"))
        .and(warp::path::end())
        .and(warp::query::<handler::UserPageQuery>())
        .and(friends.clone())
        .and(timeout.clone())
        .and_then(handler::get_incoming_friend_requests);

    let remove = warp::post()
        .and(warp::path!("friends" / "remove"))
        .and(warp::body::json())
        .and(friends.clone())
        .and(timeout.clone())
        .and_then(handler::remove_friend_relation);

    let friend_list = warp::get()
        .and(warp::path("friends"))
        .and(warp::path::end())
        .and(warp::query::<handler::UserPageQuery>())
        .and(friends.clone())
        .and(timeout.clone())
        .and_then(handler::get_friends_of_user);

    let relation = warp::get()
        .and(warp::path("friend_relation"))
        .and(warp::path::end())
        .and(warp::query::<handler::UserPairQuery>())
        .and(friends.clone())
        .and(timeout.clone())
        .and_then(handler::get_friend_relation);

    let count = warp::get()
        .and(warp::path("friend_count"))
        .and(warp::path::end())
        .and(warp::query::<handler::UserQuery>())
        .and(friends.clone())
        .and(timeout.clone())
        .and_then(handler::get_friend_count);

    let counts = warp::post()
        .and(warp::path("friend_counts"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(friends)
        .and(timeout)
        .and_then(handler::get_many_friend_count);

    create_request
        .or(accept_request)
        .unify()
        .or(decline_request)
        .unify()
        .or(incoming_requests)
        .unify()
        .or(remove)
        .unify()
        .or(friend_list)
        .unify()
        .or(relation)
        .unify()
        .or(count)
        .unify()
        .or(counts)
        .unify()
        .boxed()
}

fn favorite_routes(server: &Server) -> BoxedFilter<(Json,)> {
    let favorites = with(server.favorite_service.clone());
    let timeout = with_timeout(server.request_timeout);

    let favor = warp::post()
        .and(warp::path("favorites"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(favorites.clone())
        .and(timeout.clone())
        .and_then(handler::favor_party);

    let defavor = warp::post()
        .and(warp::path!("favorites" / "remove"))
        .and(warp::body::json())
        .and(favorites.clone())
        .and(timeout.clone())
        .and_then(handler::defavor_party);

    let by_user = warp::get()
        .and(warp::path("favorites"))
        .and(warp::path::end())
        .and(warp::query::<handler::UserPageQuery>())
        .and(favorites.clone())
        .and(timeout.clone())
        .and_then(handler::get_favorite_parties_by_user);

    let by_party = warp::get()
        .and(warp::path("favorisers"))
        .and(warp::path::end())
        .and(warp::query::<handler::PartyPageQuery>())
        .and(favorites.clone())
        .and(timeout.clone())
        .and_then(handler::get_favorising_users_by_party);

    let count = warp::get()
        .and(warp::path("favorite_count"))
        .and(warp::path::end())
        .and(warp::query::<handler::PartyQuery>())
        .and(favorites.clone())
        .and(timeout.clone())
        .and_then(handler::get_favorite_party_count);

    let counts = warp::post()
        .and(warp::path("favorite_counts"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(favorites)
        .and(timeout)
        .and_then(handler::get_many_favorite_party_count);

    favor
        .or(defavor)
        .unify()
        .or(by_user)
        .unify()
        .or(by_party)
        .unify()
        .or(count)
        .unify()
        .or(counts)
        .unify()
        .boxed()
}

fn party_routes(server: &Server) -> BoxedFilter<(Json,)> {
    let participation = with(server.participation_service.clone());
    let timeout = with_timeout(server.request_timeout);

    let invite = warp::post()
        .and(warp::path("party_invites"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(participation.clone())
        .and(timeout.clone())
        .and_then(handler::invite);

    let decline = warp::post()
        .and(warp::path!("party_invites" / "decline"))
        .and(warp::body::json())
        .and(participation.clone())
        .and(timeout.clone())
        .and_then(handler::decline_invite);

    let accept = warp::post()
        .and(warp::path!("party_invites" / "accept"))
        .and(warp::body::json())
        .and(participation.clone())
        .and(timeout.clone())
        .and_then(handler::accept_invite);

    let join = warp::post()
        .and(warp::path!("party_participants" / "join"))
        .and(warp::body::json())
        .and(participation.clone())
        .and(timeout.clone())
        .and_then(handler::join_party);

    let leave = warp::post()
        .and(warp::path!("party_participants" / "leave"))
        .and(warp::body::json())
        .and(participation.clone())
        .and(timeout.clone())
        .and_then(handler::leave_party);

    let invites = warp::get()
        .and(warp::path("party_invites"))
        .and(warp::path::end())
        .and(warp::query::<handler::UserPageQuery>())
        .and(participation.clone())
        .and(timeout.clone())
        .and_then(handler::get_user_invites);

    let participants = warp::get()
        .and(warp::path("party_participants"))
        .and(warp::path::end())
        .and(warp::query::<handler::PartyPageQuery>())
        .and(participation.clone())
        .and(timeout.clone())
        .and_then(handler::get_party_participants);

    let user_parties = warp::get()
        .and(warp::path("user_parties"))
        .and(warp::path::end())
        .and(warp::query::<handler::UserPageQuery>())
        .and(participation)
        .and(timeout)
        .and_then(handler::get_user_parties);

    invite
        .or(decline)
        .unify()
        .or(accept)
        .unify()
        .or(join)
        .unify()
        .or(leave)
        .unify()
        .or(invites)
        .unify()
        .or(participants)
        .unify()
        .or(user_parties)
        .unify()
        .boxed()
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_timeout(
    timeout: Duration,
) -> impl Filter<Extract = (Duration,), Error = Infallible> + Clone {
    warp::any().map(move || timeout)
}
