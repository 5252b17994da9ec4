// tests/postgres_tests.rs
//
// Needs a running Postgres: DATABASE_URL=... cargo test -- --ignored

use std::collections::HashMap;

use placement::{
    grading::{GradingPolicy, grade_diagnostic},
    models::question::CreateQuestionRequest,
    store::{PgStore, QuizStore},
};
use sqlx::postgres::PgPoolOptions;

async fn connect() -> PgStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    PgStore::new(pool)
}

async fn seed_course(store: &PgStore) -> i64 {
    let title = format!("course_{}", uuid::Uuid::new_v4());
    sqlx::query_scalar("INSERT INTO courses (title) VALUES ($1) RETURNING id")
        .bind(title)
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
#[ignore]
async fn diagnostic_bank_round_trip_and_placement_upsert() {
    let store = connect().await;
    let course_id = seed_course(&store).await;

    for (level, correct, section) in [
        (1, "A", "Basics"),
        (1, "A", "Basics"),
        (2, "B", "Advanced"),
    ] {
        sqlx::query(
            r#"
            INSERT INTO diagnostic_questions
                (course_id, level, question_text, options, correct_answer, recommended_starting_section)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(course_id)
        .bind(level)
        .bind("Question")
        .bind(serde_json::json!(["A", "B"]))
        .bind(correct)
        .bind(section)
        .execute(store.pool())
        .await
        .unwrap();
    }

    let bank = store.diagnostic_questions(course_id).await.unwrap();
    assert_eq!(bank.len(), 3);
    assert_eq!(bank[0].options, vec!["A", "B"]);
    assert!(bank.windows(2).all(|w| (w[0].level, w[0].id) < (w[1].level, w[1].id)));

    let answers: HashMap<i64, String> = bank
        .iter()
        .filter(|q| q.level == 1)
        .map(|q| (q.id, "A".to_string()))
        .collect();
    let feedback =
        grade_diagnostic(course_id, 2, &answers, &bank, &GradingPolicy::default()).unwrap();
    assert_eq!(feedback.recommended_starting_section, "Advanced");

    // Submitting twice keeps one row.
    store.save_placement(77, course_id, 2, &feedback).await.unwrap();
    let record = store.save_placement(77, course_id, 2, &feedback).await.unwrap();
    assert_eq!(record.levels_passed, 1);

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM placement_records WHERE user_id = $1 AND course_id = $2",
    )
    .bind(77_i64)
    .bind(course_id)
    .fetch_one(store.pool())
    .await
    .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore]
async fn exam_questions_keep_position_order() {
    let store = connect().await;
    let course_id = seed_course(&store).await;

    let exam_id: i64 = sqlx::query_scalar(
        "INSERT INTO exams (course_id, section, title) VALUES ($1, 'Basics', 'Quiz') RETURNING id",
    )
    .bind(course_id)
    .fetch_one(store.pool())
    .await
    .unwrap();

    let request = |text: &str, position: Option<i32>| CreateQuestionRequest {
        exam_id,
        level: 1,
        text: text.to_string(),
        options: vec!["A".to_string(), "B".to_string()],
        correct_answer: "A".to_string(),
        feedback: None,
        position,
    };

    store.create_question(&request("second", None)).await.unwrap();
    store.create_question(&request("third", None)).await.unwrap();
    store.create_question(&request("first", Some(-1))).await.unwrap();

    let texts: Vec<String> = store
        .exam_questions(exam_id)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.text)
        .collect();
    assert_eq!(texts, vec!["first", "second", "third"]);

    assert!(store.exam_exists(exam_id).await.unwrap());
    assert!(!store.exam_exists(-1).await.unwrap());
}
