use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use server::entity::member_challenge;

use crate::common::{TestApp, image_part, routes};

/// Multipart form holding only the `post` JSON part.
fn post_form(title: &str, category: i16) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().text(
        "post",
        json!({
            "title": title,
            "category": category,
            "description": "desc",
            "start_date": "2099-01-01",
            "end_date": "2099-12-31",
        })
        .to_string(),
    )
}

fn patch_form(patch: serde_json::Value) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().text("patch", patch.to_string())
}

fn cert_form(filename: &str, bytes: Vec<u8>) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part("cert", image_part(filename, bytes))
}

mod challenge_creation {
    use super::*;

    #[tokio::test]
    async fn member_can_create_a_challenge() {
        let app = TestApp::spawn().await;
        let (member_id, token) = app.create_member("author@example.com", "author").await;

        let res = app
            .post_multipart_with_token(routes::CHALLENGES, post_form("10k steps", 0), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "10k steps");
        assert_eq!(res.body["category"], 0);
        assert_eq!(res.body["author_id"], member_id);
        assert_eq!(res.body["view_count"], 0);
        assert_eq!(res.body["participant_count"], 0);
        assert!(res.body["id"].as_i64().is_some());
        // Creation returns the summary shape.
        assert!(res.body.get("my_participation").is_none());
    }

    #[tokio::test]
    async fn created_fields_survive_a_fetch() {
        let app = TestApp::spawn().await;
        let (member_id, token) = app.create_member("author@example.com", "author").await;
        let id = app
            .create_challenge_with_dates(&token, "Read 12 books", 1, "2099-03-01", "2099-03-31")
            .await;

        let res = app.get_without_token(&routes::challenge(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["title"], "Read 12 books");
        assert_eq!(res.body["category"], 1);
        assert_eq!(res.body["start_date"], "2099-03-01");
        assert_eq!(res.body["end_date"], "2099-03-31");
        assert_eq!(res.body["author_id"], member_id);
    }

    #[tokio::test]
    async fn create_with_images_links_them() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;

        let form = post_form("With images", 2)
            .part("rep", image_part("rep.png", b"rep-bytes".to_vec()))
            .part("example", image_part("ex1.png", b"example-one".to_vec()))
            .part("example", image_part("ex2.png", b"example-two".to_vec()));
        let res = app
            .post_multipart_with_token(routes::CHALLENGES, form, &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["rep_image_url"].as_str().unwrap().starts_with("/images/"));
        assert_eq!(res.body["example_image_urls"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_unauthenticated_creation() {
        let app = TestApp::spawn().await;
        let res = app
            .post_multipart_without_token(routes::CHALLENGES, post_form("nope", 0))
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_token_for_unknown_member() {
        let app = TestApp::spawn().await;
        let token = app.token_for_unknown_member(999_999);
        let res = app
            .post_multipart_with_token(routes::CHALLENGES, post_form("ghost", 0), &token)
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "IDENTITY_UNRESOLVED");
    }

    #[tokio::test]
    async fn rejects_out_of_range_category() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let res = app
            .post_multipart_with_token(routes::CHALLENGES, post_form("bad category", 7), &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_window_ending_before_it_starts() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;

        let form = reqwest::multipart::Form::new().text(
            "post",
            json!({
                "title": "Bad window",
                "category": 0,
                "description": "desc",
                "start_date": "2099-02-01",
                "end_date": "2099-01-01",
            })
            .to_string(),
        );
        let res = app
            .post_multipart_with_token(routes::CHALLENGES, form, &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_missing_post_part() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let form = reqwest::multipart::Form::new().text("unrelated", "data");
        let res = app
            .post_multipart_with_token(routes::CHALLENGES, form, &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_non_image_upload() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let form = post_form("bad upload", 0).part(
            "rep",
            reqwest::multipart::Part::bytes(b"#!/bin/sh".to_vec())
                .file_name("evil.sh")
                .mime_str("application/octet-stream")
                .unwrap(),
        );
        let res = app
            .post_multipart_with_token(routes::CHALLENGES, form, &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod challenge_update {
    use super::*;

    #[tokio::test]
    async fn author_can_patch_a_subset_of_fields() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let id = app.create_challenge(&token, "Original title", 1).await;

        let res = app
            .patch_multipart_with_token(
                &routes::challenge(id),
                patch_form(json!({ "description": "updated description" })),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        // Untouched fields keep their stored values.
        assert_eq!(res.body["title"], "Original title");
        assert_eq!(res.body["category"], 1);
        assert_eq!(res.body["description"], "updated description");
    }

    #[tokio::test]
    async fn non_author_is_forbidden() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, other_token) = app.create_member("other@example.com", "other").await;
        let id = app.create_challenge(&author_token, "Mine", 0).await;

        let res = app
            .patch_multipart_with_token(
                &routes::challenge(id),
                patch_form(json!({ "title": "Stolen" })),
                &other_token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn merged_dates_are_cross_validated() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let id = app
            .create_challenge_with_dates(&token, "Dates", 0, "2099-06-01", "2099-06-30")
            .await;

        // end_date alone, moved before the stored start_date.
        let res = app
            .patch_multipart_with_token(
                &routes::challenge(id),
                patch_form(json!({ "end_date": "2099-05-01" })),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn patching_a_missing_challenge_is_404() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let res = app
            .patch_multipart_with_token(
                &routes::challenge(41_999),
                patch_form(json!({ "title": "ghost" })),
                &token,
            )
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn new_rep_image_replaces_the_old_one() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;

        let form = post_form("Repped", 0).part("rep", image_part("old.png", b"old".to_vec()));
        let created = app
            .post_multipart_with_token(routes::CHALLENGES, form, &token)
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();
        let old_url = created.body["rep_image_url"].as_str().unwrap().to_string();

        let form = patch_form(json!({})).part("rep", image_part("new.png", b"new".to_vec()));
        let res = app
            .patch_multipart_with_token(&routes::challenge(id), form, &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new_url = res.body["rep_image_url"].as_str().unwrap();
        assert_ne!(new_url, old_url);

        // The replaced image is gone.
        let old = app.get_without_token(&old_url.to_string()).await;
        assert_eq!(old.status, 404);
    }
}

mod participation {
    use super::*;

    #[tokio::test]
    async fn joining_returns_the_detail_view() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, member_token) = app.create_member("walker@example.com", "walker").await;
        let id = app.create_challenge(&author_token, "Joinable", 0).await;

        let res = app
            .post_with_token(&routes::participate(id), &member_token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["participant_count"], 1);
        assert_eq!(res.body["my_participation"]["cert_count"], 0);
        assert_eq!(res.body["my_participation"]["status"], "active");
    }

    #[tokio::test]
    async fn joining_twice_conflicts_and_keeps_one_ledger_row() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (member_id, member_token) = app.create_member("walker@example.com", "walker").await;
        let id = app.create_challenge(&author_token, "Once only", 0).await;

        let first = app
            .post_with_token(&routes::participate(id), &member_token)
            .await;
        assert_eq!(first.status, 201);

        let second = app
            .post_with_token(&routes::participate(id), &member_token)
            .await;
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "CONFLICT");

        let rows = member_challenge::Entity::find()
            .filter(member_challenge::Column::ChallengeId.eq(id))
            .filter(member_challenge::Column::MemberId.eq(member_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn joining_an_ended_challenge_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, member_token) = app.create_member("late@example.com", "late").await;
        let id = app
            .create_challenge_with_dates(&author_token, "Long over", 0, "2020-01-01", "2020-01-31")
            .await;

        let res = app
            .post_with_token(&routes::participate(id), &member_token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn joining_a_missing_challenge_is_404() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("walker@example.com", "walker").await;
        let res = app.post_with_token(&routes::participate(40_404), &token).await;
        assert_eq!(res.status, 404);
    }
}

mod certification {
    use super::*;

    #[tokio::test]
    async fn non_participant_cannot_certify() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, outsider_token) = app.create_member("outsider@example.com", "outsider").await;
        let id = app.create_challenge(&author_token, "Members only", 0).await;

        let res = app
            .patch_multipart_with_token(
                &routes::cert(id),
                cert_form("proof.png", b"photo".to_vec()),
                &outsider_token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "NOT_PARTICIPANT");
    }

    #[tokio::test]
    async fn certifying_increments_the_count() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, member_token) = app.create_member("walker@example.com", "walker").await;
        let id = app.create_challenge(&author_token, "Daily proof", 0).await;
        app.post_with_token(&routes::participate(id), &member_token)
            .await;

        let first = app
            .patch_multipart_with_token(
                &routes::cert(id),
                cert_form("day1.png", b"day one".to_vec()),
                &member_token,
            )
            .await;
        assert_eq!(first.status, 201, "{}", first.text);
        assert_eq!(first.body["my_participation"]["cert_count"], 1);
        assert!(first.body["my_participation"]["last_cert_at"].is_string());

        let second = app
            .patch_multipart_with_token(
                &routes::cert(id),
                cert_form("day2.png", b"day two".to_vec()),
                &member_token,
            )
            .await;
        assert_eq!(second.status, 201);
        assert_eq!(second.body["my_participation"]["cert_count"], 2);

        // The detail view keeps only the most recent image.
        let latest_url = second.body["my_participation"]["cert_image_url"]
            .as_str()
            .unwrap();
        assert_ne!(
            latest_url,
            first.body["my_participation"]["cert_image_url"]
                .as_str()
                .unwrap()
        );
    }

    #[tokio::test]
    async fn missing_cert_image_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, member_token) = app.create_member("walker@example.com", "walker").await;
        let id = app.create_challenge(&author_token, "Evidence required", 0).await;
        app.post_with_token(&routes::participate(id), &member_token)
            .await;

        let res = app
            .patch_multipart_with_token(
                &routes::cert(id),
                reqwest::multipart::Form::new().text("unrelated", "x"),
                &member_token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn anonymous_caller_gets_the_summary_shape() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let id = app.create_challenge(&author_token, "Public face", 0).await;

        let res = app.get_without_token(&routes::challenge(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Public face");
        assert!(res.body.get("my_participation").is_none());
    }

    #[tokio::test]
    async fn authenticated_non_participant_also_gets_summary() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, other_token) = app.create_member("other@example.com", "other").await;
        let id = app.create_challenge(&author_token, "Not joined", 0).await;

        let res = app.get_with_token(&routes::challenge(id), &other_token).await;

        assert_eq!(res.status, 200);
        assert!(res.body.get("my_participation").is_none());
    }

    #[tokio::test]
    async fn each_participant_sees_only_their_own_certification() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, alice_token) = app.create_member("alice@example.com", "alice").await;
        let (_, bob_token) = app.create_member("bob@example.com", "bob").await;
        let id = app.create_challenge(&author_token, "Shared goal", 0).await;

        app.post_with_token(&routes::participate(id), &alice_token)
            .await;
        app.post_with_token(&routes::participate(id), &bob_token)
            .await;

        app.patch_multipart_with_token(
            &routes::cert(id),
            cert_form("alice.png", b"alice evidence".to_vec()),
            &alice_token,
        )
        .await;
        app.patch_multipart_with_token(
            &routes::cert(id),
            cert_form("bob.png", b"bob evidence".to_vec()),
            &bob_token,
        )
        .await;

        let alice_view = app.get_with_token(&routes::challenge(id), &alice_token).await;
        let bob_view = app.get_with_token(&routes::challenge(id), &bob_token).await;

        let alice_url = alice_view.body["my_participation"]["cert_image_url"]
            .as_str()
            .unwrap()
            .to_string();
        let bob_url = bob_view.body["my_participation"]["cert_image_url"]
            .as_str()
            .unwrap()
            .to_string();
        assert_ne!(alice_url, bob_url);

        // Each member can fetch their own evidence...
        let own = app.get_with_token(&alice_url, &alice_token).await;
        assert_eq!(own.status, 200);
        assert_eq!(own.text, "alice evidence");

        // ...but not the other's, and anonymous callers see neither.
        let crossed = app.get_with_token(&bob_url, &alice_token).await;
        assert_eq!(crossed.status, 404);
        let anonymous = app.get_without_token(&bob_url).await;
        assert_eq!(anonymous.status, 404);
    }

    #[tokio::test]
    async fn sequential_reads_bump_the_view_count_by_one_each() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let id = app.create_challenge(&author_token, "Counted", 0).await;

        for expected in 1..=3_i64 {
            let res = app.get_without_token(&routes::challenge(id)).await;
            assert_eq!(res.status, 200);
            assert_eq!(res.body["view_count"], expected);
        }
    }

    #[tokio::test]
    async fn missing_challenge_is_404_without_bumping_anything() {
        let app = TestApp::spawn().await;
        let res = app.get_without_token(&routes::challenge(123_456)).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn non_author_cannot_delete() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, other_token) = app.create_member("other@example.com", "other").await;
        let id = app.create_challenge(&author_token, "Keep out", 0).await;

        let res = app.delete_with_token(&routes::challenge(id), &other_token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn author_delete_cascades_to_the_ledger() {
        let app = TestApp::spawn().await;
        let (_, author_token) = app.create_member("author@example.com", "author").await;
        let (_, member_token) = app.create_member("walker@example.com", "walker").await;
        let id = app.create_challenge(&author_token, "Short lived", 0).await;
        app.post_with_token(&routes::participate(id), &member_token)
            .await;

        let res = app.delete_with_token(&routes::challenge(id), &author_token).await;
        assert_eq!(res.status, 204);

        let gone = app.get_without_token(&routes::challenge(id)).await;
        assert_eq!(gone.status, 404);

        let rows = member_challenge::Entity::find()
            .filter(member_challenge::Column::ChallengeId.eq(id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn deleting_a_missing_challenge_is_404() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let res = app.delete_with_token(&routes::challenge(55_555), &token).await;
        assert_eq!(res.status, 404);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn paginates_a_category() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;

        for i in 0..25 {
            app.create_challenge(&token, &format!("Habit {i}"), 2).await;
        }
        // Noise in another category must not leak in.
        app.create_challenge(&token, "Different category", 0).await;

        let page1 = app
            .get_without_token(&routes::category(2, "page=1&size=10"))
            .await;
        assert_eq!(page1.status, 200);
        assert_eq!(page1.body["data"].as_array().unwrap().len(), 10);
        assert_eq!(page1.body["pagination"]["total"], 25);
        assert_eq!(page1.body["pagination"]["total_pages"], 3);
        assert_eq!(page1.body["pagination"]["page"], 1);

        let page3 = app
            .get_without_token(&routes::category(2, "page=3&size=10"))
            .await;
        assert_eq!(page3.body["data"].as_array().unwrap().len(), 5);

        // Out-of-range pages are empty, not errors.
        let page4 = app
            .get_without_token(&routes::category(2, "page=4&size=10"))
            .await;
        assert_eq!(page4.status, 200);
        assert_eq!(page4.body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn rejects_an_out_of_range_category() {
        let app = TestApp::spawn().await;
        let res = app.get_without_token(&routes::category(9, "")).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_an_unknown_sort_key() {
        let app = TestApp::spawn().await;
        let res = app
            .get_without_token(&routes::category(1, "sort-by=oldest"))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn popularity_sort_puts_most_viewed_first() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let quiet = app.create_challenge(&token, "Quiet", 3).await;
        let popular = app.create_challenge(&token, "Popular", 3).await;

        // Two detail reads make `popular` the most viewed.
        app.get_without_token(&routes::challenge(popular)).await;
        app.get_without_token(&routes::challenge(popular)).await;

        let res = app
            .get_without_token(&routes::category(3, "sort-by=popularity"))
            .await;
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data[0]["id"], popular);
        assert_eq!(data[1]["id"], quiet);
    }

    #[tokio::test]
    async fn newest_sort_puts_latest_creation_first() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        let older = app.create_challenge(&token, "Older", 3).await;
        let newer = app.create_challenge(&token, "Newer", 3).await;

        let res = app
            .get_without_token(&routes::category(3, "sort-by=newest"))
            .await;
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data[0]["id"], newer);
        assert_eq!(data[1]["id"], older);
    }
}

mod search {
    use super::*;

    #[tokio::test]
    async fn matches_substrings_case_insensitively() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        app.create_challenge(&token, "Morning Run", 0).await;
        app.create_challenge(&token, "Evening run club", 0).await;
        app.create_challenge(&token, "Read books", 1).await;

        let res = app.get_without_token(&routes::search("searchTitle=RUN")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn like_wildcards_in_the_term_are_literal() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        app.create_challenge(&token, "100% focus", 1).await;
        app.create_challenge(&token, "100 pushups", 1).await;

        let res = app
            .get_without_token(&routes::search("searchTitle=100%25"))
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["title"], "100% focus");
    }

    #[tokio::test]
    async fn no_matches_is_an_empty_page_not_an_error() {
        let app = TestApp::spawn().await;
        let res = app
            .get_without_token(&routes::search("searchTitle=nothing-here"))
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 0);
        assert_eq!(res.body["pagination"]["total"], 0);
    }
}

mod titles {
    use super::*;

    #[tokio::test]
    async fn returns_every_title_for_autocomplete() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_member("author@example.com", "author").await;
        app.create_challenge(&token, "Alpha", 0).await;
        app.create_challenge(&token, "Beta", 1).await;
        app.create_challenge(&token, "Gamma", 2).await;

        let res = app.get_without_token(routes::TITLES).await;

        assert_eq!(res.status, 200);
        let titles: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles.len(), 3);
        assert!(titles.contains(&"Alpha"));
        assert!(titles.contains(&"Beta"));
        assert!(titles.contains(&"Gamma"));
    }
}
