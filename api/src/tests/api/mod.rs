mod routes;
mod sitemap;
