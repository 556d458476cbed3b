mod common;

use digit_recognizer::recognizer::CONNECTIVITY_MESSAGE;
use digit_recognizer::{DigitRecognizer, PredictionResult, RecognizerError};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

const PREDICT_PATH: &str = "/v1/models/digit_recognizer_v1.0.0:predict";

#[tokio::test]
async fn test_round_trip_predicts_nine() {
    common::init_test_logger();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "outputs": [[0, 0, 0, 0, 0, 0, 0, 0, 0, 1]]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = common::descriptor_dir();
    let image = common::write_digit_image(dir.path(), "digit.png", 28, 28);
    let config = common::test_config(&mock_server.uri(), dir.path());

    let recognizer = DigitRecognizer::from_config(&config).unwrap();
    let result = recognizer.predict_digit(&image).await;

    assert_eq!(
        result,
        PredictionResult::Success {
            digit: 9,
            score: 1.0
        }
    );
    assert_eq!(result.confidence_percent(), Some(100.0));
}

#[tokio::test]
async fn test_request_body_has_configured_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "outputs": [[0.1, 0.7, 0.2, 0, 0, 0, 0, 0, 0, 0]]
        })))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    common::write_descriptor(dir.path(), "1.0.0", 20, 24);
    let image = common::write_digit_image(dir.path(), "large.png", 140, 90);
    let config = common::test_config(&mock_server.uri(), dir.path());

    let recognizer = DigitRecognizer::from_config(&config).unwrap();
    let result = recognizer.predict_digit(&image).await;
    assert_eq!(
        result,
        PredictionResult::Success {
            digit: 1,
            score: 0.7
        }
    );

    let requests: Vec<Request> = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let inputs = body["inputs"].as_array().unwrap();
    assert_eq!(inputs.len(), 1);

    let rows = inputs[0].as_array().unwrap();
    assert_eq!(rows.len(), 24);
    for row in rows {
        let pixels = row.as_array().unwrap();
        assert_eq!(pixels.len(), 20);
        for pixel in pixels {
            let channels = pixel.as_array().unwrap();
            assert_eq!(channels.len(), 1);
            let value = channels[0].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&value));
        }
    }
}

#[tokio::test]
async fn test_server_error_message_is_passed_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = common::descriptor_dir();
    let image = common::write_digit_image(dir.path(), "digit.png", 28, 28);
    let recognizer =
        DigitRecognizer::from_config(&common::test_config(&mock_server.uri(), dir.path()))
            .unwrap();

    let result = recognizer.predict_digit(&image).await;
    assert_eq!(result, PredictionResult::failure("internal error"));
}

#[tokio::test]
async fn test_unreachable_server_is_a_failure_result() {
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let dir = common::descriptor_dir();
    let image = common::write_digit_image(dir.path(), "digit.png", 28, 28);
    let recognizer = DigitRecognizer::from_config(&common::test_config(&uri, dir.path())).unwrap();

    let result = recognizer.predict_digit(&image).await;
    assert_eq!(result, PredictionResult::failure(CONNECTIVITY_MESSAGE));
}

#[tokio::test]
async fn test_upload_bytes_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "outputs": [[0, 0, 0, 0.9, 0.1, 0, 0, 0, 0, 0]]
        })))
        .mount(&mock_server)
        .await;

    let dir = common::descriptor_dir();
    let image = common::write_digit_image(dir.path(), "digit.png", 56, 56);
    let bytes = std::fs::read(image).unwrap();
    let recognizer =
        DigitRecognizer::from_config(&common::test_config(&mock_server.uri(), dir.path()))
            .unwrap();

    let result = recognizer.predict_bytes(&bytes).await;
    assert_eq!(
        result,
        PredictionResult::Success {
            digit: 3,
            score: 0.9
        }
    );
}

#[test]
fn test_preprocessed_tensor_matches_descriptor() {
    let dir = TempDir::new().unwrap();
    common::write_descriptor(dir.path(), "1.0.0", 28, 28);
    let image = common::write_digit_image(dir.path(), "digit.png", 100, 100);
    let recognizer =
        DigitRecognizer::from_config(&common::test_config("http://127.0.0.1:9", dir.path()))
            .unwrap();

    let tensor = recognizer.load_and_preprocess(&image).unwrap();
    assert_eq!(tensor.shape(), [1, 28, 28, 1]);
    assert!(tensor.as_array().iter().all(|v| (0.0..=1.0).contains(v)));
    // The stroke survives the downscale.
    assert!(tensor.as_array().iter().any(|&v| v > 0.5));
}

#[test]
fn test_mismatched_descriptor_version_aborts_setup() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("v1.0.0.json"),
        r#"{"model": {"model_version": "0.9.0", "final_image_width": 28, "final_image_height": 28}}"#,
    )
    .unwrap();

    let err =
        DigitRecognizer::from_config(&common::test_config("http://127.0.0.1:9", dir.path()))
            .unwrap_err();
    assert!(matches!(err, RecognizerError::ConfigParse(_)));
}
