use rocket::Route;

mod poll;

pub fn routes() -> Vec<Route> {
    poll::routes()
}
