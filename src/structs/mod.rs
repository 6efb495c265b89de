pub mod track_request;
