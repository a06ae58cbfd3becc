pub mod detection_error;
pub mod detection_stabilizer;
pub mod face_detector;
pub mod face_record;
pub mod landmark;
