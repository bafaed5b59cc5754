mod buttons;
mod http_api;
mod scan;
mod support;
