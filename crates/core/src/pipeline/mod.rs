pub mod screen_image_use_case;
pub mod verify_voter_use_case;
