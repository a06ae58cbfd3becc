pub mod detection_inbox;
pub mod face_detection_adapter;
pub mod replay_landmark_detector;
pub mod threaded_landmark_detector;
